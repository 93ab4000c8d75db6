//! Greedy drone/package matching.
//!
//! Drones are handled one at a time in the order they come back to the
//! depot. Each drone looks at the most urgent package and the cheapest
//! package and takes one of them:
//!
//! 1. the cheapest one, if it can be delivered and the drone still be back
//!    before the most urgent package has to leave;
//! 2. the cheapest one, if serving the urgent package first would push the
//!    cheap one past its expiry while the next drone is back before it;
//! 3. the most urgent one otherwise.

use chrono::{DateTime, Utc};

use crate::error::{validate_inputs, DispatchError};
use crate::feasibility::{Fleet, ReadyDrone};
use crate::models::{Assignment, Coordinate, DispatchPlan, DroneSnapshot, PackageSnapshot};
use crate::queues::{DroneQueue, PackageQueues};
use crate::rules::DispatchRules;

/// Which rule picked the package for a drone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Cheapest package fits before the urgent one must leave.
    CheapFirst,
    /// Cheapest package would otherwise expire unserved.
    ProtectCheap,
    /// Most urgent package.
    Urgent,
    /// Only one ordering still had a valid front.
    OnlyCandidate,
}

/// Batch scheduler for one snapshot of drones and packages.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    rules: DispatchRules,
}

impl Scheduler {
    pub fn new(rules: DispatchRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &DispatchRules {
        &self.rules
    }

    /// Validate the snapshots, derive ready times and delivery windows, and
    /// run the matching loop.
    pub fn plan(
        &self,
        depot: Coordinate,
        drones: &[DroneSnapshot],
        packages: &[PackageSnapshot],
        now: DateTime<Utc>,
    ) -> Result<DispatchPlan, DispatchError> {
        self.rules.validate()?;
        validate_inputs(&depot, drones, packages)?;

        let fleet = Fleet::ingest(depot, drones, packages, now, &self.rules);
        Ok(self.run(&fleet))
    }

    /// Run the matching loop over an already ingested fleet.
    pub fn run(&self, fleet: &Fleet) -> DispatchPlan {
        let mut drones = DroneQueue::new(&fleet.drones);
        let mut packages = PackageQueues::new(&fleet.feasible);
        let mut plan = DispatchPlan {
            assignments: Vec::with_capacity(fleet.feasible.len().min(fleet.drones.len())),
            undelivered: fleet.unreachable.clone(),
        };

        tracing::debug!(
            drones = fleet.drones.len(),
            feasible = fleet.feasible.len(),
            unreachable = fleet.unreachable.len(),
            cleaning = ?self.rules.shortest_cleaning,
            "starting dispatch run"
        );

        while packages.has_entries() {
            let Some(drone) = drones.pop_most_ready() else {
                break;
            };
            let next_ready = drones.peek_ready_time();

            packages.reconcile(
                drone.ready_time,
                self.rules.shortest_cleaning,
                &mut plan.undelivered,
            );

            if let Some((package_id, decision)) = self.choose(&drone, next_ready, &mut packages) {
                tracing::debug!(
                    drone_id = %drone.drone_id,
                    package_id = %package_id,
                    ready_time = drone.ready_time,
                    ?decision,
                    "assigned package"
                );
                plan.assignments.push(Assignment {
                    drone_id: drone.drone_id,
                    package_id,
                });
            }
        }

        packages.drain(&mut plan.undelivered);

        tracing::info!(
            assigned = plan.assignments.len(),
            undelivered = plan.undelivered.len(),
            idle_drones = drones.len(),
            "dispatch run complete"
        );

        plan
    }

    fn choose(
        &self,
        drone: &ReadyDrone,
        next_ready: f64,
        packages: &mut PackageQueues,
    ) -> Option<(String, Decision)> {
        let r = drone.ready_time;

        let (urgent_expiry, short) = match (packages.urgent_front(), packages.shortest_front()) {
            (Some(urgent), Some(short)) => (urgent.expiry, short.clone()),
            (Some(_), None) => {
                let entry = packages.take_urgent()?;
                return Some((entry.package_id, Decision::OnlyCandidate));
            }
            (None, Some(short)) => {
                // The cost queue's own eviction test may let an expired
                // package through; never hand that one out.
                if short.expiry < r {
                    return None;
                }
                let entry = packages.take_shortest()?;
                return Some((entry.package_id, Decision::OnlyCandidate));
            }
            (None, None) => return None,
        };

        let decision = if short.round_trip + r <= urgent_expiry {
            Decision::CheapFirst
        } else if urgent_expiry + r > short.expiry && short.expiry > next_ready {
            Decision::ProtectCheap
        } else {
            Decision::Urgent
        };

        let package_id = match decision {
            Decision::CheapFirst | Decision::ProtectCheap => packages.take_shortest()?.package_id,
            Decision::Urgent | Decision::OnlyCandidate => packages.take_urgent()?.package_id,
        };
        Some((package_id, decision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::FeasiblePackage;
    use crate::rules::ShortestCleaning;

    fn sample_fleet(drones: &[(&str, f64)], packages: &[(&str, f64, f64)]) -> Fleet {
        Fleet {
            drones: drones
                .iter()
                .map(|(id, ready_time)| ReadyDrone {
                    drone_id: id.to_string(),
                    ready_time: *ready_time,
                })
                .collect(),
            feasible: packages
                .iter()
                .map(|(id, round_trip, expiry)| FeasiblePackage {
                    package_id: id.to_string(),
                    one_way: round_trip / 2.0,
                    round_trip: *round_trip,
                    expiry: *expiry,
                })
                .collect(),
            unreachable: Vec::new(),
        }
    }

    fn pairs(plan: &DispatchPlan) -> Vec<(&str, &str)> {
        plan.assignments
            .iter()
            .map(|a| (a.drone_id.as_str(), a.package_id.as_str()))
            .collect()
    }

    #[test]
    fn cheap_package_first_when_urgent_one_can_wait() {
        let fleet = sample_fleet(
            &[("d1", 0.0), ("d2", 50.0)],
            &[("short", 40.0, 1000.0), ("long", 200.0, 60.0)],
        );
        let plan = Scheduler::default().run(&fleet);

        // 40 + 0 <= 60, so d1 takes the short trip; d2 is back at 50 and
        // still makes the 60s window on the long one.
        assert_eq!(pairs(&plan), vec![("d1", "short"), ("d2", "long")]);
        assert!(plan.undelivered.is_empty());
    }

    #[test]
    fn urgent_package_wins_when_cheap_one_has_slack() {
        let fleet = sample_fleet(
            &[("d1", 0.0), ("d2", 10.0)],
            &[("cheap", 100.0, 5000.0), ("urgent", 300.0, 50.0)],
        );
        let plan = Scheduler::default().run(&fleet);

        // 100 > 50 so cheap-first fails; cheap has plenty of slack, so the
        // urgent package goes first and d2 picks up the cheap one.
        assert_eq!(pairs(&plan), vec![("d1", "urgent"), ("d2", "cheap")]);
    }

    #[test]
    fn cheap_package_protected_while_next_drone_is_close() {
        let fleet = sample_fleet(
            &[("d1", 10.0), ("d2", 50.0)],
            &[("cheap", 100.0, 105.0), ("urgent", 300.0, 100.0)],
        );
        let plan = Scheduler::default().run(&fleet);

        // 100 + 10 > 100 so cheap-first fails. Serving urgent first would
        // push the cheap departure to 110 > 105, and d2 is back at 50 < 105,
        // so d1 takes the cheap package and d2 the urgent one.
        assert_eq!(pairs(&plan), vec![("d1", "cheap"), ("d2", "urgent")]);
        assert!(plan.undelivered.is_empty());
    }

    #[test]
    fn urgent_package_served_when_next_drone_is_far() {
        let fleet = sample_fleet(
            &[("d1", 10.0), ("d2", 500.0)],
            &[("cheap", 100.0, 105.0), ("urgent", 300.0, 100.0)],
        );
        let plan = Scheduler::default().run(&fleet);

        assert_eq!(pairs(&plan), vec![("d1", "urgent")]);
        assert_eq!(plan.undelivered, vec!["cheap".to_string()]);
    }

    #[test]
    fn last_drone_sees_infinite_lookahead() {
        let fleet = sample_fleet(
            &[("only", 10.0)],
            &[("cheap", 100.0, 105.0), ("urgent", 300.0, 100.0)],
        );
        let plan = Scheduler::default().run(&fleet);

        // 105 > inf is false, so the single drone serves the urgent package.
        assert_eq!(pairs(&plan), vec![("only", "urgent")]);
        assert_eq!(plan.undelivered, vec!["cheap".to_string()]);
    }

    #[test]
    fn no_drones_leaves_everything_undelivered() {
        let fleet = sample_fleet(&[], &[("a", 10.0, 100.0), ("b", 20.0, 200.0)]);
        let plan = Scheduler::default().run(&fleet);
        assert!(plan.assignments.is_empty());
        assert!(plan.is_partition_of(["a", "b"]));
    }

    #[test]
    fn late_drone_starves_expiring_package() {
        let fleet = sample_fleet(&[("late", 1000.0)], &[("soon", 10.0, 500.0)]);
        let plan = Scheduler::default().run(&fleet);
        assert!(plan.assignments.is_empty());
        assert_eq!(plan.undelivered, vec!["soon".to_string()]);
    }

    #[test]
    fn unreachable_packages_come_first_in_undelivered() {
        let mut fleet = sample_fleet(&[], &[("feasible", 10.0, 100.0)]);
        fleet.unreachable.push("expired".into());
        let plan = Scheduler::default().run(&fleet);
        assert_eq!(
            plan.undelivered,
            vec!["expired".to_string(), "feasible".to_string()]
        );
    }

    #[test]
    fn round_trip_cleaning_discards_short_trips_for_late_drones() {
        let fleet = sample_fleet(&[("d1", 100.0)], &[("short", 50.0, 10_000.0)]);

        let literal = Scheduler::new(
            DispatchRules::default().with_cleaning(ShortestCleaning::RoundTrip),
        )
        .run(&fleet);
        assert!(literal.assignments.is_empty());
        assert_eq!(literal.undelivered, vec!["short".to_string()]);

        let expiry = Scheduler::default().run(&fleet);
        assert_eq!(pairs(&expiry), vec![("d1", "short")]);
    }

    #[test]
    fn rejects_invalid_rules_before_scheduling() {
        let scheduler = Scheduler::new(DispatchRules::default().with_cruise_speed(-1.0));
        let result = scheduler.plan(Coordinate::new(0.0, 0.0), &[], &[], Utc::now());
        assert!(matches!(result, Err(DispatchError::InvalidRules(_))));
    }
}
