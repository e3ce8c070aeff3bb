//! Intake path: pull packs from a company, register them for ordered
//! delivery, spread their problems over the shared solvers.

use tracing::{debug, error, info};

use crate::dispatch::Dispatcher;
use crate::metrics;
use crate::tracker::CompanyLane;

/// Closes the lane and checks the company out of the dispatcher when intake
/// ends, including by panic inside `wait_for_pack`. Without this a panicking
/// company would leave workers waiting for it forever.
struct ProducerGuard<'a> {
    lane: &'a CompanyLane,
    dispatcher: &'a Dispatcher,
}

impl Drop for ProducerGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!(company = %self.lane.id(), "company panicked while producing packs");
        }
        self.lane.close();
        if self.dispatcher.producer_finished() {
            info!("all companies finished submitting; open solvers flushed");
        }
    }
}

/// Body of one company's intake thread. Returns the number of packs taken in.
pub fn run_intake(lane: &CompanyLane, dispatcher: &Dispatcher) -> usize {
    let _guard = ProducerGuard { lane, dispatcher };
    let mut received = 0;
    while let Some(pack) = lane.company().wait_for_pack() {
        // Solvers get their own handles to the polygons; the pack itself
        // waits in the tracker until it can be returned.
        let problems = pack.problems().to_vec();
        let key = lane.register(pack);
        let queued = dispatcher.load_pack(lane.id(), key, &problems);
        metrics::inc_packs_received();
        debug!(
            company = %lane.id(),
            seq = key.seq(),
            problems = problems.len(),
            queued,
            "pack received"
        );
        received += 1;
    }
    debug!(company = %lane.id(), received, "company out of packs");
    received
}
