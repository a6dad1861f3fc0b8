//! Address geocoding against the French national address API
//! (`api-adresse.data.gouv.fr`).

use chrono::{DateTime, Utc};
use datapulse_core::{
  Record as _, Warehouse,
  bronze::{RawGeocode, RawLibrary},
};
use reqwest::Url;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
  Error, Result,
  bronze::{BronzeContext, land},
  fetch::{Page, PageSource},
};

pub const ARCHIVE_KEY: &str = "geocoding/geocoding_raw.json";

// ─── Response shape ──────────────────────────────────────────────────────────

/// The subset of the GeoJSON `FeatureCollection` the API returns that we use.
#[derive(Debug, Deserialize)]
struct SearchResponse {
  #[serde(default)]
  features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
  #[serde(default)]
  properties: Properties,
  geometry:   Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
  city:     Option<String>,
  postcode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
  /// `[longitude, latitude]`
  coordinates: Vec<f64>,
}

/// Decode a search response and keep its first candidate, if any.
pub fn first_candidate(
  address: &str,
  body: &str,
  ingested_at: DateTime<Utc>,
) -> Result<Option<RawGeocode>> {
  let response: SearchResponse = serde_json::from_str(body)?;
  let Some(feature) = response.features.into_iter().next() else {
    return Ok(None);
  };

  let coords = feature.geometry.map(|g| g.coordinates).unwrap_or_default();
  Ok(Some(RawGeocode {
    address: address.to_owned(),
    city: feature.properties.city,
    postal_code: feature.properties.postcode,
    latitude: coords.get(1).copied(),
    longitude: coords.first().copied(),
    ingested_at,
  }))
}

pub fn search_url(base: &str, address: &str) -> Result<Url> {
  Url::parse_with_params(base, &[("q", address), ("limit", "1")])
    .map_err(|e| Error::Url(format!("{base}: {e}")))
}

// ─── Connector ───────────────────────────────────────────────────────────────

/// Configured addresses followed by the distinct library addresses already in
/// bronze, first occurrence wins.
async fn input_addresses<W: Warehouse, S: PageSource>(
  ctx: &BronzeContext<'_, W, S>,
) -> Result<Vec<String>> {
  let config = &ctx.sources.geocoding;
  let mut addresses: Vec<String> = Vec::new();
  let mut push = |address: &str| {
    let address = address.trim();
    if !address.is_empty() && !addresses.iter().any(|a| a == address) {
      addresses.push(address.to_owned());
    }
  };

  for address in &config.addresses {
    push(address);
  }

  if config.include_library_addresses
    && ctx
      .warehouse
      .table_exists(RawLibrary::TABLE)
      .await
      .map_err(Error::warehouse)?
  {
    let libraries: Vec<RawLibrary> = ctx.warehouse.read().await.map_err(Error::warehouse)?;
    for address in libraries.iter().filter_map(|l| l.address.as_deref()) {
      push(address);
    }
  }

  Ok(addresses)
}

pub async fn run<W: Warehouse, S: PageSource>(ctx: &BronzeContext<'_, W, S>) -> Result<usize> {
  let config = &ctx.sources.geocoding;
  let addresses = input_addresses(ctx).await?;
  info!(addresses = addresses.len(), "geocoding addresses");

  let mut geocodes = Vec::new();
  for (i, address) in addresses.iter().enumerate() {
    if i > 0 && !config.delay().is_zero() {
      tokio::time::sleep(config.delay()).await;
    }

    let url = search_url(&config.url, address)?;
    let body = match ctx.source.fetch(url.as_str()).await {
      Ok(Page::Found(body)) => body,
      Ok(Page::NotFound) => {
        error!(address, "geocoding endpoint returned 404, skipping");
        continue;
      }
      Err(e) => {
        error!(address, error = %e, "geocoding request failed, skipping");
        continue;
      }
    };

    match first_candidate(address, &body, Utc::now()) {
      Ok(Some(geocode)) => geocodes.push(geocode),
      Ok(None) => warn!(address, "no geocoding result, skipping"),
      Err(e) => error!(address, error = %e, "geocoding response undecodable, skipping"),
    }
  }

  land(ctx, geocodes, ARCHIVE_KEY).await
}
