pub mod audit;
pub mod error;
pub mod feasibility;
pub mod models;
pub mod queues;
pub mod rules;
pub mod scheduler;
pub mod spatial;

pub use audit::{audit_plan, DeliveryAudit, DispatchStats};
pub use error::{validate_inputs, DispatchError};
pub use feasibility::{FeasiblePackage, Fleet, ReadyDrone};
pub use models::{Assignment, Coordinate, DispatchPlan, DroneSnapshot, PackageSnapshot};
pub use queues::{DroneQueue, PackageQueues, ShortestEntry, UrgentEntry};
pub use rules::{DispatchRules, ShortestCleaning};
pub use scheduler::Scheduler;
pub use spatial::{haversine_distance, travel_seconds, DEFAULT_CRUISE_SPEED_KMH};
