//! Error types for the solver engine, configuration and the optimizer lifecycle.

use std::io;

use thiserror::Error;

use crate::problem::ProblemKind;

/// Returned by a [`Solver`](crate::solver::Solver) that refuses a polygon.
///
/// The intake path checks `has_free_capacity()` before every add, so seeing
/// one of these at runtime means an invariant was broken.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    #[error("solver is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("solver has already been solved")]
    AlreadySolved,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} solver capacity must be positive")]
    ZeroCapacity(ProblemKind),

    #[error("worker pool needs at least one thread")]
    NoWorkers,

    #[error("requested {requested} worker threads, at most {max} allowed")]
    TooManyWorkers { requested: usize, max: usize },
}

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("worker pool needs at least one thread")]
    NoWorkers,

    #[error("optimizer is already running")]
    AlreadyRunning,

    #[error("optimizer is not running")]
    NotRunning,

    #[error("companies must be registered before start")]
    RegisterWhileRunning,

    #[error("failed to spawn thread {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("thread {name} panicked")]
    ThreadPanicked { name: String },
}
