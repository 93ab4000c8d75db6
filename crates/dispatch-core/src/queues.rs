//! Priority queues feeding the scheduler.
//!
//! Drones come out in order of ready time. Packages sit in two heaps at
//! once, one ordered by urgency and one by delivery cost. Taking a package
//! out of one heap leaves a stale copy in the other; stale copies are
//! discarded lazily when they reach the front, using a shared set of
//! processed package ids.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use serde::{Deserialize, Serialize};

use crate::feasibility::{FeasiblePackage, ReadyDrone};
use crate::rules::ShortestCleaning;

#[derive(Debug, Clone)]
struct DroneKey(ReadyDrone);

impl PartialEq for DroneKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for DroneKey {}

impl PartialOrd for DroneKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DroneKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .ready_time
            .total_cmp(&other.0.ready_time)
            .then_with(|| self.0.drone_id.cmp(&other.0.drone_id))
    }
}

/// Drones ordered by the instant they are back at the depot.
///
/// Ties on ready time are broken by drone id so runs are reproducible.
#[derive(Debug, Clone, Default)]
pub struct DroneQueue {
    heap: BinaryHeap<Reverse<DroneKey>>,
}

impl DroneQueue {
    pub fn new(drones: &[ReadyDrone]) -> Self {
        Self {
            heap: drones.iter().cloned().map(|d| Reverse(DroneKey(d))).collect(),
        }
    }

    /// Remove and return the drone that is ready soonest.
    pub fn pop_most_ready(&mut self) -> Option<ReadyDrone> {
        self.heap.pop().map(|Reverse(DroneKey(drone))| drone)
    }

    /// Ready time of the drone at the front, or infinity when none is left.
    ///
    /// Called right after [`pop_most_ready`](Self::pop_most_ready) this is
    /// the ready time of the second-most-ready drone.
    pub fn peek_ready_time(&self) -> f64 {
        self.heap
            .peek()
            .map(|Reverse(DroneKey(drone))| drone.ready_time)
            .unwrap_or(f64::INFINITY)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Entry of the urgency-ordered queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgentEntry {
    pub expiry: f64,
    pub package_id: String,
}

/// Entry of the cost-ordered queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortestEntry {
    pub round_trip: f64,
    pub package_id: String,
    pub expiry: f64,
}

impl PartialEq for UrgentEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for UrgentEntry {}

impl PartialOrd for UrgentEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for UrgentEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.expiry
            .total_cmp(&other.expiry)
            .then_with(|| self.package_id.cmp(&other.package_id))
    }
}

impl PartialEq for ShortestEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for ShortestEntry {}

impl PartialOrd for ShortestEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ShortestEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.round_trip
            .total_cmp(&other.round_trip)
            .then_with(|| self.package_id.cmp(&other.package_id))
            .then_with(|| self.expiry.total_cmp(&other.expiry))
    }
}

/// The two package orderings and their shared processed set.
#[derive(Debug, Clone, Default)]
pub struct PackageQueues {
    urgent: BinaryHeap<Reverse<UrgentEntry>>,
    shortest: BinaryHeap<Reverse<ShortestEntry>>,
    processed: HashSet<String>,
}

impl PackageQueues {
    pub fn new(packages: &[FeasiblePackage]) -> Self {
        let urgent = packages
            .iter()
            .map(|p| {
                Reverse(UrgentEntry {
                    expiry: p.expiry,
                    package_id: p.package_id.clone(),
                })
            })
            .collect();
        let shortest = packages
            .iter()
            .map(|p| {
                Reverse(ShortestEntry {
                    round_trip: p.round_trip,
                    package_id: p.package_id.clone(),
                    expiry: p.expiry,
                })
            })
            .collect();

        Self {
            urgent,
            shortest,
            processed: HashSet::with_capacity(packages.len()),
        }
    }

    /// True while at least one queue still holds entries, stale or not.
    pub fn has_entries(&self) -> bool {
        !self.urgent.is_empty() || !self.shortest.is_empty()
    }

    pub fn urgent_front(&self) -> Option<&UrgentEntry> {
        self.urgent.peek().map(|Reverse(entry)| entry)
    }

    pub fn shortest_front(&self) -> Option<&ShortestEntry> {
        self.shortest.peek().map(|Reverse(entry)| entry)
    }

    pub fn is_processed(&self, package_id: &str) -> bool {
        self.processed.contains(package_id)
    }

    /// Discard stale fronts of both queues for a drone ready at `ready_time`.
    ///
    /// A front is stale once its package is processed or the drone can no
    /// longer pick it up in time. Evicting from one queue marks the package
    /// processed, which may expose a stale front in the other, so both are
    /// cleaned until neither changes. Newly evicted ids are appended to
    /// `undelivered`. Returns the number of ids appended.
    pub fn reconcile(
        &mut self,
        ready_time: f64,
        cleaning: ShortestCleaning,
        undelivered: &mut Vec<String>,
    ) -> usize {
        let before = undelivered.len();
        loop {
            self.clean_urgent(ready_time, undelivered);
            if self.clean_shortest(ready_time, cleaning, undelivered) == 0 {
                break;
            }
        }
        undelivered.len() - before
    }

    fn clean_urgent(&mut self, ready_time: f64, undelivered: &mut Vec<String>) -> usize {
        let mut popped = 0;
        while let Some(Reverse(front)) = self.urgent.peek() {
            let stale = self.processed.contains(&front.package_id) || front.expiry < ready_time;
            if !stale {
                break;
            }
            if let Some(Reverse(entry)) = self.urgent.pop() {
                self.discard(entry.package_id, undelivered);
                popped += 1;
            }
        }
        popped
    }

    fn clean_shortest(
        &mut self,
        ready_time: f64,
        cleaning: ShortestCleaning,
        undelivered: &mut Vec<String>,
    ) -> usize {
        let mut popped = 0;
        while let Some(Reverse(front)) = self.shortest.peek() {
            let too_late = match cleaning {
                ShortestCleaning::Expiry => front.expiry < ready_time,
                ShortestCleaning::RoundTrip => front.round_trip < ready_time,
            };
            if !too_late && !self.processed.contains(&front.package_id) {
                break;
            }
            if let Some(Reverse(entry)) = self.shortest.pop() {
                self.discard(entry.package_id, undelivered);
                popped += 1;
            }
        }
        popped
    }

    fn discard(&mut self, package_id: String, undelivered: &mut Vec<String>) {
        if self.processed.insert(package_id.clone()) {
            tracing::trace!(package_id = %package_id, "package dropped from queues");
            undelivered.push(package_id);
        }
    }

    /// Pop the urgency front and mark it processed.
    pub fn take_urgent(&mut self) -> Option<UrgentEntry> {
        let Reverse(entry) = self.urgent.pop()?;
        self.processed.insert(entry.package_id.clone());
        Some(entry)
    }

    /// Pop the cost front and mark it processed.
    pub fn take_shortest(&mut self) -> Option<ShortestEntry> {
        let Reverse(entry) = self.shortest.pop()?;
        self.processed.insert(entry.package_id.clone());
        Some(entry)
    }

    /// Empty both queues, reporting every package not yet processed.
    pub fn drain(&mut self, undelivered: &mut Vec<String>) {
        while let Some(Reverse(entry)) = self.urgent.pop() {
            self.discard(entry.package_id, undelivered);
        }
        while let Some(Reverse(entry)) = self.shortest.pop() {
            self.discard(entry.package_id, undelivered);
        }
    }
}
