//! Orchestrator: owns the shared pipeline state and the three thread sets.
//!
//! Threads per run:
//! - `worker-{i}`: one per requested worker, solving queued solvers
//! - `intake-{c}`: one per company, pulling packs
//! - `delivery-{c}`: one per company, returning packs in order
//!
//! `stop()` joins intake first, then delivery, then workers. It returns once
//! every company has signalled end-of-stream and every pack it submitted has
//! been handed back.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::company::{Company, CompanyId};
use crate::delivery;
use crate::dispatch::Dispatcher;
use crate::error::OptimizerError;
use crate::geometry;
use crate::intake;
use crate::problem::Polygon;
use crate::solver::SolverFactory;
use crate::tracker::CompanyLane;
use crate::worker::{self, ActiveWorkers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Stopped,
    Running,
    Stopping,
}

/// State shared by every thread of one run.
pub(crate) struct Shared {
    dispatcher: Dispatcher,
    lanes: Vec<CompanyLane>,
    workers: ActiveWorkers,
}

#[derive(Default)]
struct Threads {
    workers: Vec<(String, JoinHandle<usize>)>,
    intake: Vec<(String, JoinHandle<usize>)>,
    delivery: Vec<(String, JoinHandle<usize>)>,
}

impl Threads {
    /// Join in shutdown order. Reports the first thread that panicked.
    fn join_all(self) -> Result<(), OptimizerError> {
        let mut first_panic = None;
        for (name, handle) in self
            .intake
            .into_iter()
            .chain(self.delivery)
            .chain(self.workers)
        {
            if handle.join().is_err() {
                warn!(thread = %name, "thread panicked");
                first_panic.get_or_insert(name);
            }
        }
        match first_panic {
            Some(name) => Err(OptimizerError::ThreadPanicked { name }),
            None => Ok(()),
        }
    }
}

fn spawn<F>(name: String, body: F) -> Result<(String, JoinHandle<usize>), OptimizerError>
where
    F: FnOnce() -> usize + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(body)
        .map(|handle| (name.clone(), handle))
        .map_err(|source| OptimizerError::Spawn { name, source })
}

/// Distributes companies' problem packs over a pool of solver workers and
/// returns each company's packs in the order it submitted them.
pub struct Optimizer {
    factory: Arc<dyn SolverFactory>,
    companies: Vec<Arc<dyn Company>>,
    state: Lifecycle,
    threads: Option<Threads>,
}

impl Optimizer {
    pub fn new(factory: Arc<dyn SolverFactory>) -> Self {
        Self {
            factory,
            companies: Vec::new(),
            state: Lifecycle::Stopped,
            threads: None,
        }
    }

    /// Register a company. Only allowed while stopped.
    pub fn add_company(&mut self, company: Arc<dyn Company>) -> Result<CompanyId, OptimizerError> {
        if self.state != Lifecycle::Stopped {
            return Err(OptimizerError::RegisterWhileRunning);
        }
        let id = CompanyId(self.companies.len());
        self.companies.push(company);
        Ok(id)
    }

    pub fn companies(&self) -> usize {
        self.companies.len()
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Spawn `worker_threads` workers plus an intake and a delivery thread per company.
    pub fn start(&mut self, worker_threads: usize) -> Result<(), OptimizerError> {
        if self.state != Lifecycle::Stopped {
            return Err(OptimizerError::AlreadyRunning);
        }
        if worker_threads == 0 {
            return Err(OptimizerError::NoWorkers);
        }

        let shared = Arc::new(Shared {
            dispatcher: Dispatcher::new(Arc::clone(&self.factory), self.companies.len()),
            lanes: self
                .companies
                .iter()
                .enumerate()
                .map(|(i, company)| CompanyLane::new(CompanyId(i), Arc::clone(company)))
                .collect(),
            workers: ActiveWorkers::new(worker_threads),
        });

        let mut threads = Threads::default();
        if let Err(err) = spawn_threads(&shared, worker_threads, &mut threads) {
            // Check out whatever never started so the started threads can finish.
            for _ in threads.intake.len()..shared.lanes.len() {
                shared.dispatcher.producer_finished();
            }
            for _ in threads.workers.len()..worker_threads {
                shared.workers.leave(&shared.lanes);
            }
            let _ = threads.join_all();
            return Err(err);
        }

        info!(
            workers = worker_threads,
            companies = shared.lanes.len(),
            "optimizer started"
        );
        self.threads = Some(threads);
        self.state = Lifecycle::Running;
        Ok(())
    }

    /// Wait for every thread to finish. Blocks until all companies have run
    /// out of packs and all their packs have been delivered.
    pub fn stop(&mut self) -> Result<(), OptimizerError> {
        let threads = match (self.state, self.threads.take()) {
            (Lifecycle::Running, Some(threads)) => threads,
            _ => return Err(OptimizerError::NotRunning),
        };
        self.state = Lifecycle::Stopping;
        let result = threads.join_all();
        self.state = Lifecycle::Stopped;
        info!("optimizer stopped");
        result
    }

    /// Solve one polygon's cheapest triangulation on the calling thread.
    pub fn check_algorithm_min(polygon: &Polygon) -> f64 {
        let cost = geometry::min_triangulation(polygon.points());
        polygon.set_min_triangulation(cost);
        cost
    }

    /// Count one polygon's triangulations on the calling thread.
    pub fn check_algorithm_cnt(polygon: &Polygon) -> u128 {
        let count = geometry::triangulation_count(polygon.points().len());
        polygon.set_triangulation_count(count);
        count
    }
}

fn spawn_threads(
    shared: &Arc<Shared>,
    worker_threads: usize,
    threads: &mut Threads,
) -> Result<(), OptimizerError> {
    for i in 0..worker_threads {
        let shared = Arc::clone(shared);
        threads.workers.push(spawn(format!("worker-{i}"), move || {
            worker::run_worker(i, &shared.dispatcher, &shared.lanes, &shared.workers)
        })?);
    }
    for c in 0..shared.lanes.len() {
        let intake_shared = Arc::clone(shared);
        threads.intake.push(spawn(format!("intake-{c}"), move || {
            intake::run_intake(&intake_shared.lanes[c], &intake_shared.dispatcher)
        })?);
        let delivery_shared = Arc::clone(shared);
        threads.delivery.push(spawn(format!("delivery-{c}"), move || {
            delivery::run_delivery(&delivery_shared.lanes[c], &delivery_shared.workers)
        })?);
    }
    Ok(())
}

impl Drop for Optimizer {
    fn drop(&mut self) {
        if self.state == Lifecycle::Running {
            warn!("optimizer dropped while running; joining threads");
            let _ = self.stop();
        }
    }
}
