//! Library crate for packflow: a threaded pipeline that batches companies'
//! problem packs into capacity-bounded solvers, runs them on a worker pool and
//! hands every pack back to its company in submission order.
//!
//! Flow: `intake` (one thread per company) -> `dispatch` (shared current
//! solvers + queue) -> `worker` (pool) -> `tracker` (per-company completion)
//! -> `delivery` (one thread per company). `optimizer` wires them together.
//!
//! The intake, worker and delivery loops are plain functions over borrowed
//! state so tests can drive each stage without spawning the whole pipeline.

pub mod company;
pub mod config;
pub mod constants;
pub mod delivery;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod intake;
pub mod metrics;
pub mod optimizer;
pub mod problem;
pub mod sample;
pub mod solver;
pub mod tracker;
pub mod worker;

pub use company::{Company, CompanyId};
pub use config::EngineConfig;
pub use error::{ConfigError, OptimizerError, SolverError};
pub use optimizer::{Lifecycle, Optimizer};
pub use problem::{Point, Polygon, Problem, ProblemKind, ProblemPack};
pub use solver::{ReferenceSolverFactory, Solver, SolverFactory};
