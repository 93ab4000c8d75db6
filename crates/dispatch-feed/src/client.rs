//! HTTP client for the drone/package snapshot feed.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use dispatch_core::{Coordinate, DroneSnapshot, PackageSnapshot};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::backoff::Backoff;
use crate::geocode::{depot_from_response, GeocodeResponse};
use crate::wire::{drones_from_wire, packages_from_wire, WireDrone, WirePackage};

/// How hard to try before giving up on a feed request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Client for the snapshot feed and the geocoder.
pub struct FeedClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl FeedClient {
    /// Create a new feed client.
    ///
    /// # Arguments
    /// * `base_url` - Feed root; drones and packages live at `/drones` and `/packages`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the current drone snapshot.
    pub async fn fetch_drones(&self) -> Result<Vec<DroneSnapshot>> {
        let url = format!("{}/drones", self.base_url);
        let records: Vec<WireDrone> = self.get_json(&url, &[]).await?;
        tracing::info!(count = records.len(), "fetched drones");
        Ok(drones_from_wire(records))
    }

    /// Fetch the current package snapshot.
    pub async fn fetch_packages(&self) -> Result<Vec<PackageSnapshot>> {
        let url = format!("{}/packages", self.base_url);
        let records: Vec<WirePackage> = self.get_json(&url, &[]).await?;
        tracing::info!(count = records.len(), "fetched packages");
        packages_from_wire(records).context("Invalid package in feed")
    }

    /// Resolve a street address to the depot coordinate.
    pub async fn geocode_depot(
        &self,
        geocode_url: &str,
        address: &str,
        api_key: Option<&str>,
    ) -> Result<Coordinate> {
        let mut query = vec![("address", address)];
        if let Some(key) = api_key {
            query.push(("key", key));
        }

        let response: GeocodeResponse = self.get_json(geocode_url, &query).await?;
        let depot = depot_from_response(address, &response)?;
        tracing::info!(lat = depot.lat, lon = depot.lon, "resolved depot address");
        Ok(depot)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let mut backoff = Backoff::new(self.retry.base_delay, self.retry.max_delay);
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.try_get_json(url, query).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    let delay = backoff.fail();
                    tracing::warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "feed request failed: {e:#}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e.context(format!("Giving up on {url} after {attempt} attempts")))
                }
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?
            .error_for_status()
            .with_context(|| format!("Error status from {url}"))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("Malformed response from {url}"))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load a drone snapshot saved in the feed's JSON format.
pub async fn load_drones(path: impl AsRef<Path>) -> Result<Vec<DroneSnapshot>> {
    let records: Vec<WireDrone> = read_json(path.as_ref()).await?;
    Ok(drones_from_wire(records))
}

/// Load a package snapshot saved in the feed's JSON format.
pub async fn load_packages(path: impl AsRef<Path>) -> Result<Vec<PackageSnapshot>> {
    let path = path.as_ref();
    let records: Vec<WirePackage> = read_json(path).await?;
    packages_from_wire(records).with_context(|| format!("Invalid package in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("dispatch-feed-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = FeedClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn loads_snapshots_from_files() {
        let drones = temp_file(
            "drones.json",
            r#"[{"droneId": 1, "location": {"latitude": -37.8, "longitude": 144.9}, "packages": []}]"#,
        );
        let packages = temp_file(
            "packages.json",
            r#"[{"packageId": 2, "destination": {"latitude": -37.7, "longitude": 145.0}, "deadline": 1700000000}]"#,
        );

        let loaded_drones = load_drones(&drones).await.unwrap();
        let loaded_packages = load_packages(&packages).await.unwrap();

        assert_eq!(loaded_drones.len(), 1);
        assert_eq!(loaded_drones[0].drone_id, "1");
        assert_eq!(loaded_packages[0].package_id, "2");
        assert_eq!(loaded_packages[0].deadline.timestamp(), 1_700_000_000);

        let _ = std::fs::remove_file(drones);
        let _ = std::fs::remove_file(packages);
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = load_drones("/nonexistent/drones.json").await.unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/drones.json"));
    }
}
