//! Dispatcher configuration from environment.

use std::env;

pub const DEFAULT_FEED_URL: &str = "https://codetest.kube.getswift.co";
pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_DEPOT_ADDRESS: &str = "303 Collins Street, Melbourne, VIC 3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub geocode_url: String,
    pub geocode_api_key: Option<String>,
    pub depot_address: String,
    pub retries: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            feed_url: lookup("DISPATCH_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            geocode_url: lookup("DISPATCH_GEOCODE_URL")
                .unwrap_or_else(|| DEFAULT_GEOCODE_URL.to_string()),
            geocode_api_key: lookup("DISPATCH_GEOCODE_KEY").filter(|k| !k.is_empty()),
            depot_address: lookup("DISPATCH_DEPOT_ADDRESS")
                .unwrap_or_else(|| DEFAULT_DEPOT_ADDRESS.to_string()),
            retries: lookup("DISPATCH_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
        }
    }
}
