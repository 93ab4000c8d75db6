//! Records as served by the drone/package snapshot API.

use std::fmt;

use chrono::DateTime;
use dispatch_core::{Coordinate, DroneSnapshot, PackageSnapshot};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// Identifiers arrive as numbers from the live feed and as strings from
/// hand-written fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Number(n) => write!(f, "{n}"),
            WireId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&WireLocation> for Coordinate {
    fn from(loc: &WireLocation) -> Self {
        Coordinate::new(loc.latitude, loc.longitude)
    }
}

/// Package currently on board a drone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCarriedPackage {
    pub destination: WireLocation,
    #[serde(default)]
    pub package_id: Option<WireId>,
    #[serde(default)]
    pub deadline: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDrone {
    pub drone_id: WireId,
    pub location: WireLocation,
    #[serde(default)]
    pub packages: Vec<WireCarriedPackage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePackage {
    pub package_id: WireId,
    pub destination: WireLocation,
    /// Unix timestamp, seconds
    pub deadline: f64,
}

impl WireDrone {
    /// Only the first carried package matters; a drone holds at most one.
    pub fn into_snapshot(self) -> DroneSnapshot {
        let snapshot = DroneSnapshot::idle(self.drone_id.to_string(), (&self.location).into());
        match self.packages.first() {
            Some(carried) => snapshot.carrying((&carried.destination).into()),
            None => snapshot,
        }
    }
}

impl WirePackage {
    pub fn into_snapshot(self) -> Result<PackageSnapshot, FeedError> {
        let package_id = self.package_id.to_string();
        let millis = self.deadline * 1000.0;
        let deadline = if millis.is_finite() {
            DateTime::from_timestamp_millis(millis.round() as i64)
        } else {
            None
        };

        match deadline {
            Some(deadline) => Ok(PackageSnapshot::new(
                package_id,
                (&self.destination).into(),
                deadline,
            )),
            None => Err(FeedError::InvalidDeadline {
                package_id,
                deadline: self.deadline,
            }),
        }
    }
}

pub fn drones_from_wire(records: Vec<WireDrone>) -> Vec<DroneSnapshot> {
    records.into_iter().map(WireDrone::into_snapshot).collect()
}

pub fn packages_from_wire(records: Vec<WirePackage>) -> Result<Vec<PackageSnapshot>, FeedError> {
    records.into_iter().map(WirePackage::into_snapshot).collect()
}
