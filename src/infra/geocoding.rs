//! Address geocoding backed by the ArcGIS `findAddressCandidates` endpoint.
//!
//! The adapter owns transport details only: query encoding, timeout and HTTP
//! error mapping, and decoding of the candidate list into [`Coordinates`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::domain::Coordinates;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const OUT_FIELDS: &str = "Match_addr,Addr_type";

/// Resolves a free-text address to coordinates.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `LocationNotFound` when the service has no match (or the address is
    /// blank), `UpstreamUnavailable` when it could not be asked or answered
    /// with something unreadable.
    async fn resolve(&self, address: &str) -> AppResult<Coordinates>;
}

/// Geocoder performing one GET per lookup against a single endpoint.
pub struct ArcGisGeocoder {
    client: Client,
    endpoint: Url,
}

impl ArcGisGeocoder {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Geocoder for ArcGisGeocoder {
    async fn resolve(&self, address: &str) -> AppResult<Coordinates> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::LocationNotFound);
        }

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("f", "json"), ("singleLine", address), ("outFields", OUT_FIELDS)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        let coordinates = parse_coordinates(body.as_ref())?;
        tracing::debug!(
            address,
            lat = coordinates.lat,
            lon = coordinates.lon,
            "Address geocoded"
        );
        Ok(coordinates)
    }
}

#[derive(Debug, Deserialize)]
struct CandidatesDto {
    candidates: Vec<CandidateDto>,
}

#[derive(Debug, Deserialize)]
struct CandidateDto {
    location: Option<LocationDto>,
}

#[derive(Debug, Deserialize)]
struct LocationDto {
    x: Option<f64>,
    y: Option<f64>,
}

fn parse_coordinates(body: &[u8]) -> AppResult<Coordinates> {
    let decoded: CandidatesDto = serde_json::from_slice(body)
        .map_err(|error| AppError::upstream(format!("invalid geocoder payload: {error}")))?;

    let Some(first) = decoded.candidates.into_iter().next() else {
        return Err(AppError::LocationNotFound);
    };

    let location = first
        .location
        .ok_or_else(|| AppError::upstream("first candidate has no location"))?;

    match (location.x, location.y) {
        (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => {
            Ok(Coordinates { lat, lon })
        }
        (Some(_), Some(_)) => Err(AppError::upstream("candidate coordinates are not finite")),
        _ => Err(AppError::upstream("candidate location is missing x or y")),
    }
}

fn map_transport_error(error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        AppError::upstream(format!("geocoder timed out: {error}"))
    } else {
        AppError::upstream(format!("geocoder transport error: {error}"))
    }
}

fn map_status_error(status: StatusCode) -> AppError {
    AppError::upstream(format!("geocoder returned status {}", status.as_u16()))
}
