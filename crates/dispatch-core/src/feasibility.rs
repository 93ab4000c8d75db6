//! Per-drone ready times and per-package departure windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Coordinate, DroneSnapshot, PackageSnapshot};
use crate::rules::DispatchRules;
use crate::spatial::travel_seconds;

/// A drone with the number of seconds until it is back at the depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyDrone {
    pub drone_id: String,
    pub ready_time: f64,
}

/// A package that can still make its deadline if a drone departs in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasiblePackage {
    pub package_id: String,
    /// Depot to destination, seconds
    pub one_way: f64,
    /// Depot to destination and back, seconds
    pub round_trip: f64,
    /// Latest departure from the depot, seconds from now
    pub expiry: f64,
}

/// Everything the scheduler needs, derived once from the snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fleet {
    pub drones: Vec<ReadyDrone>,
    pub feasible: Vec<FeasiblePackage>,
    /// Packages that would miss their deadline even if they left right now.
    pub unreachable: Vec<String>,
}

/// Seconds until the drone can start a new delivery from the depot.
pub fn ready_time(drone: &DroneSnapshot, depot: Coordinate, rules: &DispatchRules) -> f64 {
    let speed = rules.cruise_speed_kmh;
    match drone.active_destination {
        Some(dest) => {
            travel_seconds(drone.location, dest, speed) + travel_seconds(dest, depot, speed)
        }
        None => travel_seconds(drone.location, depot, speed),
    }
}

/// Derive the delivery window of a package. Returns `None` when the deadline
/// cannot be met even by an immediate departure.
pub fn package_window(
    package: &PackageSnapshot,
    depot: Coordinate,
    now: DateTime<Utc>,
    rules: &DispatchRules,
) -> Option<FeasiblePackage> {
    let one_way = travel_seconds(depot, package.destination, rules.cruise_speed_kmh);
    let until_deadline = (package.deadline - now).num_milliseconds() as f64 / 1000.0;
    let expiry = until_deadline - one_way;

    if expiry < 0.0 {
        return None;
    }

    Some(FeasiblePackage {
        package_id: package.package_id.clone(),
        one_way,
        round_trip: 2.0 * one_way,
        expiry,
    })
}

impl Fleet {
    /// Classify all drones and packages against the depot at instant `now`.
    pub fn ingest(
        depot: Coordinate,
        drones: &[DroneSnapshot],
        packages: &[PackageSnapshot],
        now: DateTime<Utc>,
        rules: &DispatchRules,
    ) -> Self {
        let drones = drones
            .iter()
            .map(|drone| ReadyDrone {
                drone_id: drone.drone_id.clone(),
                ready_time: ready_time(drone, depot, rules),
            })
            .collect();

        let mut feasible = Vec::with_capacity(packages.len());
        let mut unreachable = Vec::new();
        for package in packages {
            match package_window(package, depot, now, rules) {
                Some(window) => feasible.push(window),
                None => {
                    tracing::trace!(package_id = %package.package_id, "unreachable at ingestion");
                    unreachable.push(package.package_id.clone());
                }
            }
        }

        Self {
            drones,
            feasible,
            unreachable,
        }
    }

    pub fn total_packages(&self) -> usize {
        self.feasible.len() + self.unreachable.len()
    }

    pub fn drone(&self, drone_id: &str) -> Option<&ReadyDrone> {
        self.drones.iter().find(|d| d.drone_id == drone_id)
    }

    pub fn package(&self, package_id: &str) -> Option<&FeasiblePackage> {
        self.feasible.iter().find(|p| p.package_id == package_id)
    }

    /// Ids of every package seen at ingestion, feasible ones first.
    pub fn package_ids(&self) -> impl Iterator<Item = &str> {
        self.feasible
            .iter()
            .map(|p| p.package_id.as_str())
            .chain(self.unreachable.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::point_after_seconds;
    use chrono::Duration;

    const DEPOT: Coordinate = Coordinate::new(-37.8152065, 144.963937);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn idle_drone_flies_straight_home() {
        let rules = DispatchRules::default();
        let location = point_after_seconds(DEPOT, 600.0, rules.cruise_speed_kmh);
        let drone = DroneSnapshot::idle("d", location);
        assert!(close(ready_time(&drone, DEPOT, &rules), 600.0));

        let parked = DroneSnapshot::idle("p", DEPOT);
        assert_eq!(ready_time(&parked, DEPOT, &rules), 0.0);
    }

    #[test]
    fn busy_drone_finishes_delivery_first() {
        let rules = DispatchRules::default();
        // Drone sits at the depot but still has to fly 300s out and back.
        let dest = point_after_seconds(DEPOT, 300.0, rules.cruise_speed_kmh);
        let drone = DroneSnapshot::idle("d", DEPOT).carrying(dest);
        assert!(close(ready_time(&drone, DEPOT, &rules), 600.0));
    }

    #[test]
    fn window_subtracts_one_way_flight_from_deadline() {
        let rules = DispatchRules::default();
        let now = Utc::now();
        let dest = point_after_seconds(DEPOT, 1800.0, rules.cruise_speed_kmh);
        let package = PackageSnapshot::new("p", dest, now + Duration::seconds(5000));

        let window = package_window(&package, DEPOT, now, &rules).unwrap();
        assert!(close(window.one_way, 1800.0));
        assert!(close(window.round_trip, 3600.0));
        assert!(close(window.expiry, 3200.0));
    }

    #[test]
    fn ingest_splits_out_unreachable_packages() {
        let rules = DispatchRules::default();
        let now = Utc::now();
        let dest = point_after_seconds(DEPOT, 1800.0, rules.cruise_speed_kmh);
        let packages = vec![
            PackageSnapshot::new("late", dest, now + Duration::seconds(1000)),
            PackageSnapshot::new("past", DEPOT, now - Duration::seconds(1)),
            PackageSnapshot::new("ok", dest, now + Duration::seconds(4000)),
        ];

        let fleet = Fleet::ingest(DEPOT, &[], &packages, now, &rules);
        assert_eq!(fleet.unreachable, vec!["late".to_string(), "past".to_string()]);
        assert_eq!(fleet.feasible.len(), 1);
        assert_eq!(fleet.feasible[0].package_id, "ok");
        assert_eq!(fleet.total_packages(), 3);
    }

    #[test]
    fn deadline_exactly_now_at_depot_is_feasible() {
        let rules = DispatchRules::default();
        let now = Utc::now();
        let package = PackageSnapshot::new("p", DEPOT, now);
        let window = package_window(&package, DEPOT, now, &rules).unwrap();
        assert_eq!(window.expiry, 0.0);
    }
}
