//! Core data models for the dispatch system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A point on the earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude", alias = "lng")]
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A drone as observed at ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneSnapshot {
    pub drone_id: String,
    pub location: Coordinate,
    /// Destination of the package the drone is carrying right now, if any.
    /// The drone must drop it off before heading back to the depot.
    #[serde(default)]
    pub active_destination: Option<Coordinate>,
}

impl DroneSnapshot {
    /// Create an idle drone (no package on board).
    pub fn idle(drone_id: impl Into<String>, location: Coordinate) -> Self {
        Self {
            drone_id: drone_id.into(),
            location,
            active_destination: None,
        }
    }

    /// Mark the drone as mid-delivery towards `destination`.
    pub fn carrying(mut self, destination: Coordinate) -> Self {
        self.active_destination = Some(destination);
        self
    }
}

/// A delivery job waiting at the depot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSnapshot {
    pub package_id: String,
    pub destination: Coordinate,
    pub deadline: DateTime<Utc>,
}

impl PackageSnapshot {
    pub fn new(
        package_id: impl Into<String>,
        destination: Coordinate,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            destination,
            deadline,
        }
    }
}

/// A drone/package pairing produced by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub drone_id: String,
    pub package_id: String,
}

/// Result of one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchPlan {
    /// Assignments in the order they were made.
    #[serde(rename = "assigned")]
    pub assignments: Vec<Assignment>,
    /// Packages that will not be delivered, whether unreachable at
    /// ingestion or starved during scheduling.
    #[serde(rename = "unassigned")]
    pub undelivered: Vec<String>,
}

impl DispatchPlan {
    pub fn assigned_package(&self, package_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.package_id == package_id)
    }

    pub fn is_undelivered(&self, package_id: &str) -> bool {
        self.undelivered.iter().any(|id| id == package_id)
    }

    /// True when every id in `package_ids` shows up exactly once across the
    /// assigned and undelivered lists, and nothing else shows up at all.
    pub fn is_partition_of<'a, I>(&self, package_ids: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let expected: HashSet<&str> = package_ids.into_iter().collect();
        let mut seen = HashSet::with_capacity(expected.len());

        let all = self
            .assignments
            .iter()
            .map(|a| a.package_id.as_str())
            .chain(self.undelivered.iter().map(String::as_str));

        for id in all {
            if !expected.contains(id) || !seen.insert(id) {
                return false;
            }
        }

        seen.len() == expected.len()
    }
}
