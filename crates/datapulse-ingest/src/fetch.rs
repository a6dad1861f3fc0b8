//! The HTTP seam. Connectors fetch through [`PageSource`] so tests can serve
//! fixtures without a network.

use std::{future::Future, time::Duration};

use reqwest::{Client, StatusCode};

use crate::{Error, Result, config::HttpConfig};

/// Outcome of one successful round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
  Found(String),
  /// HTTP 404; paginated sources treat this as the end of the data.
  NotFound,
}

pub trait PageSource: Send + Sync {
  /// `GET url` and return the body. Any status other than 2xx or 404 is an
  /// error.
  fn fetch<'a>(&'a self, url: &'a str) -> impl Future<Output = Result<Page>> + Send + 'a;
}

/// [`PageSource`] over a shared [`reqwest::Client`].
///
/// Cheap to clone; the inner client is `Arc`-based.
#[derive(Clone)]
pub struct HttpSource {
  client: Client,
}

impl HttpSource {
  pub fn new(config: &HttpConfig) -> Result<Self> {
    let client = Client::builder()
      .user_agent(config.user_agent.clone())
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client })
  }
}

impl PageSource for HttpSource {
  async fn fetch(&self, url: &str) -> Result<Page> {
    let resp = self.client.get(url).send().await?;

    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
      return Ok(Page::NotFound);
    }
    if !status.is_success() {
      return Err(Error::Status { url: url.to_owned(), status: status.as_u16() });
    }
    Ok(Page::Found(resp.text().await?))
  }
}
