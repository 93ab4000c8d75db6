//! Dispatch feed - ingestion side of the drone dispatcher.
//!
//! Fetches drone and package snapshots from the remote feed (or local JSON
//! files), resolves the depot address, and turns the loosely typed wire
//! records into validated `dispatch-core` snapshots.

pub mod backoff;
pub mod client;
pub mod error;
pub mod geocode;
pub mod wire;

pub use backoff::Backoff;
pub use client::{load_drones, load_packages, FeedClient, RetryPolicy};
pub use error::FeedError;
pub use geocode::{depot_from_response, GeocodeResponse};
pub use wire::{WireDrone, WireId, WirePackage};
