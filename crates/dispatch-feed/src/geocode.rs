//! Depot lookup against a Google-geocode-compatible endpoint.

use dispatch_core::Coordinate;
use serde::Deserialize;

use crate::error::FeedError;

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: Coordinate,
}

/// Pick the depot coordinate out of a geocoding response.
///
/// The first result wins. A status other than `OK`/`ZERO_RESULTS` is
/// reported as an error even if results are present.
pub fn depot_from_response(
    address: &str,
    response: &GeocodeResponse,
) -> Result<Coordinate, FeedError> {
    if let Some(status) = response.status.as_deref() {
        if status != "OK" && status != "ZERO_RESULTS" {
            return Err(FeedError::GeocodeStatus(status.to_string()));
        }
    }

    response
        .results
        .first()
        .map(|r| r.geometry.location)
        .ok_or_else(|| FeedError::AddressNotFound(address.to_string()))
}
