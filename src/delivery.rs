//! Delivery path: hand solved packs back to their company in submission order.

use tracing::{error, trace};

use crate::metrics;
use crate::problem::ProblemPack;
use crate::tracker::CompanyLane;
use crate::worker::ActiveWorkers;

/// Block until the pack at the company's cursor is complete.
///
/// Returns `None` when the company is closed and drained, or when every
/// worker has exited (any packs still pending at that point can never
/// complete and are logged as stranded).
pub fn next_ready(lane: &CompanyLane, workers: &ActiveWorkers) -> Option<ProblemPack> {
    let mut tracker = lane.tracker.lock();
    loop {
        if let Some(pack) = tracker.pop_ready() {
            return Some(pack);
        }
        if tracker.is_drained() {
            return None;
        }
        if workers.all_exited() {
            if tracker.pending() > 0 {
                error!(
                    company = %lane.id(),
                    stranded = tracker.pending(),
                    cursor = tracker.cursor(),
                    "workers exited with packs still pending"
                );
            }
            return None;
        }
        lane.ready.wait(&mut tracker);
    }
}

/// Body of one company's delivery thread. Returns the number of packs delivered.
pub fn run_delivery(lane: &CompanyLane, workers: &ActiveWorkers) -> usize {
    let mut delivered = 0;
    while let Some(pack) = next_ready(lane, workers) {
        trace!(company = %lane.id(), seq = delivered, problems = pack.len(), "delivering pack");
        lane.company().solved_pack(pack);
        metrics::inc_packs_delivered();
        delivered += 1;
    }
    delivered
}
