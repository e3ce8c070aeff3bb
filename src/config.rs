//! Engine sizing: solver capacities and worker pool size.
//!
//! Defaults and hard limits live in `constants`.

use crate::constants::{
    DEFAULT_CNT_SOLVER_CAPACITY, DEFAULT_MIN_SOLVER_CAPACITY, DEFAULT_WORKER_THREADS,
    MAX_WORKER_THREADS,
};
use crate::error::ConfigError;
use crate::problem::ProblemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Polygons per min-cost solver instance.
    pub min_capacity: usize,
    /// Polygons per count solver instance.
    pub cnt_capacity: usize,
    pub worker_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_capacity: DEFAULT_MIN_SOLVER_CAPACITY,
            cnt_capacity: DEFAULT_CNT_SOLVER_CAPACITY,
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }
}

impl EngineConfig {
    pub fn capacity(&self, kind: ProblemKind) -> usize {
        match kind {
            ProblemKind::Min => self.min_capacity,
            ProblemKind::Cnt => self.cnt_capacity,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in ProblemKind::ALL {
            if self.capacity(kind) == 0 {
                return Err(ConfigError::ZeroCapacity(kind));
            }
        }
        if self.worker_threads == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.worker_threads > MAX_WORKER_THREADS {
            return Err(ConfigError::TooManyWorkers {
                requested: self.worker_threads,
                max: MAX_WORKER_THREADS,
            });
        }
        Ok(())
    }
}
