//! Worker pool loop: take a closed solver off the dispatch queue, solve it,
//! credit its contributions to their packs.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, error, trace};

use crate::dispatch::{Dispatcher, SolverBatch};
use crate::tracker::CompanyLane;

/// Number of worker threads still running. Delivery threads treat zero as
/// "nothing pending will ever complete".
#[derive(Debug)]
pub struct ActiveWorkers(AtomicUsize);

impl ActiveWorkers {
    pub fn new(count: usize) -> Self {
        Self(AtomicUsize::new(count))
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    pub fn all_exited(&self) -> bool {
        self.get() == 0
    }

    /// Record one worker leaving. The last one wakes every delivery thread.
    pub fn leave(&self, lanes: &[CompanyLane]) {
        let remaining = self.0.fetch_sub(1, Ordering::AcqRel) - 1;
        if remaining == 0 {
            debug!("last worker exited");
            for lane in lanes {
                lane.wake();
            }
        }
    }
}

/// Solve one batch and credit every pack that had problems in it.
pub fn complete_batch(batch: SolverBatch, lanes: &[CompanyLane]) {
    let id = batch.id();
    let kind = batch.kind();
    let contributions = batch.solve();
    trace!(batch = id, %kind, packs = contributions.len(), "solver finished");
    for contribution in &contributions {
        lanes[contribution.company.0].complete(contribution);
    }
}

/// Decrements the active worker count even if a solver panics, so delivery
/// threads never wait on a worker that is gone.
struct ExitGuard<'a> {
    id: usize,
    active: &'a ActiveWorkers,
    lanes: &'a [CompanyLane],
}

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!(worker = self.id, "worker panicked while solving");
        }
        self.active.leave(self.lanes);
    }
}

/// Body of one worker thread. Returns the number of solvers it ran.
pub fn run_worker(
    id: usize,
    dispatcher: &Dispatcher,
    lanes: &[CompanyLane],
    active: &ActiveWorkers,
) -> usize {
    let _guard = ExitGuard { id, active, lanes };
    let mut solved = 0;
    while let Some(batch) = dispatcher.next_batch() {
        complete_batch(batch, lanes);
        solved += 1;
    }
    debug!(worker = id, solved, "worker exiting");
    solved
}
