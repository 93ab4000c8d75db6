use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("package {package_id} has unrepresentable deadline {deadline}")]
    InvalidDeadline { package_id: String, deadline: f64 },
    #[error("geocoder returned status {0}")]
    GeocodeStatus(String),
    #[error("no geocoding result for {0:?}")]
    AddressNotFound(String),
}
