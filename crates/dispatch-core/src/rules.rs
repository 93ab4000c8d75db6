//! Tunable rules for a scheduling run.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::spatial::DEFAULT_CRUISE_SPEED_KMH;

/// How the cost-ordered queue decides that its front package is stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortestCleaning {
    /// Evict when the package's expiry is earlier than the drone's ready time,
    /// the same test the urgency queue applies.
    #[default]
    Expiry,
    /// Evict when the package's round-trip duration is less than the drone's
    /// ready time. Kept for parity with schedules produced by the legacy
    /// dispatcher; it can hand out packages that are already late.
    RoundTrip,
}

/// Configuration for the assignment scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchRules {
    /// Cruise speed shared by all drones, km/h
    pub cruise_speed_kmh: f64,
    /// Eviction test for the cost-ordered queue
    pub shortest_cleaning: ShortestCleaning,
}

impl Default for DispatchRules {
    fn default() -> Self {
        Self {
            cruise_speed_kmh: DEFAULT_CRUISE_SPEED_KMH,
            shortest_cleaning: ShortestCleaning::Expiry,
        }
    }
}

impl DispatchRules {
    pub fn with_cleaning(mut self, cleaning: ShortestCleaning) -> Self {
        self.shortest_cleaning = cleaning;
        self
    }

    pub fn with_cruise_speed(mut self, cruise_speed_kmh: f64) -> Self {
        self.cruise_speed_kmh = cruise_speed_kmh;
        self
    }

    pub fn validate(&self) -> Result<(), DispatchError> {
        if !self.cruise_speed_kmh.is_finite() || self.cruise_speed_kmh <= 0.0 {
            return Err(DispatchError::InvalidRules(format!(
                "cruise speed must be a positive number of km/h, got {}",
                self.cruise_speed_kmh
            )));
        }
        Ok(())
    }
}
