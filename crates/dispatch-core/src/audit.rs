//! Post-run statistics and a check that no drone was sent out too late.

use serde::{Deserialize, Serialize};

use crate::feasibility::Fleet;
use crate::models::{Assignment, DispatchPlan};

/// Counters describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    pub drones: usize,
    pub total_packages: usize,
    /// Packages that could not make their deadline even before any drone was considered
    pub unreachable_at_ingestion: usize,
    pub delivered: usize,
    pub undelivered: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryAudit {
    pub stats: DispatchStats,
    /// Assignments whose drone is back at the depot after the package's
    /// latest departure time.
    pub late_assignments: Vec<Assignment>,
    /// Whether every ingested package id appears exactly once in the plan.
    pub complete_partition: bool,
}

impl DeliveryAudit {
    pub fn is_clean(&self) -> bool {
        self.complete_partition && self.late_assignments.is_empty()
    }
}

pub fn audit_plan(fleet: &Fleet, plan: &DispatchPlan) -> DeliveryAudit {
    let stats = DispatchStats {
        drones: fleet.drones.len(),
        total_packages: fleet.total_packages(),
        unreachable_at_ingestion: fleet.unreachable.len(),
        delivered: plan.assignments.len(),
        undelivered: plan.undelivered.len(),
    };

    let late_assignments: Vec<Assignment> = plan
        .assignments
        .iter()
        .filter(|a| {
            match (fleet.drone(&a.drone_id), fleet.package(&a.package_id)) {
                (Some(drone), Some(package)) => drone.ready_time > package.expiry,
                // Anything the fleet does not know about cannot have been on time.
                _ => true,
            }
        })
        .cloned()
        .collect();

    if !late_assignments.is_empty() {
        tracing::warn!(count = late_assignments.len(), "assignments depart after package expiry");
    }

    DeliveryAudit {
        stats,
        late_assignments,
        complete_partition: plan.is_partition_of(fleet.package_ids()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::{FeasiblePackage, ReadyDrone};

    fn fleet() -> Fleet {
        Fleet {
            drones: vec![
                ReadyDrone {
                    drone_id: "early".into(),
                    ready_time: 0.0,
                },
                ReadyDrone {
                    drone_id: "late".into(),
                    ready_time: 900.0,
                },
            ],
            feasible: vec![FeasiblePackage {
                package_id: "p".into(),
                one_way: 10.0,
                round_trip: 20.0,
                expiry: 600.0,
            }],
            unreachable: vec!["gone".into()],
        }
    }

    #[test]
    fn counts_and_clean_plan() {
        let plan = DispatchPlan {
            assignments: vec![Assignment {
                drone_id: "early".into(),
                package_id: "p".into(),
            }],
            undelivered: vec!["gone".into()],
        };
        let audit = audit_plan(&fleet(), &plan);

        assert_eq!(
            audit.stats,
            DispatchStats {
                drones: 2,
                total_packages: 2,
                unreachable_at_ingestion: 1,
                delivered: 1,
                undelivered: 1,
            }
        );
        assert!(audit.is_clean());
    }

    #[test]
    fn flags_drone_returning_after_expiry() {
        let plan = DispatchPlan {
            assignments: vec![Assignment {
                drone_id: "late".into(),
                package_id: "p".into(),
            }],
            undelivered: vec!["gone".into()],
        };
        let audit = audit_plan(&fleet(), &plan);
        assert_eq!(audit.late_assignments.len(), 1);
        assert!(audit.complete_partition);
        assert!(!audit.is_clean());
    }

    #[test]
    fn flags_missing_package() {
        let plan = DispatchPlan::default();
        let audit = audit_plan(&fleet(), &plan);
        assert!(!audit.complete_partition);
    }
}
