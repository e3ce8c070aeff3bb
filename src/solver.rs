//! Solver engine: capacity-bounded accumulators that solve everything they
//! hold in one `solve()` call.
//!
//! The pipeline only talks to [`Solver`] and [`SolverFactory`]. The bundled
//! [`MinSolver`] and [`CntSolver`] run the reference algorithms from
//! `geometry`; callers may plug in any other engine.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::{ConfigError, SolverError};
use crate::geometry;
use crate::problem::{Polygon, ProblemKind};

/// A stateful batch of polygons of a single problem kind.
///
/// Lifecycle: open (accepting polygons until full) -> solved. Adding after
/// `solve()` or beyond capacity is refused.
pub trait Solver: Send {
    fn kind(&self) -> ProblemKind;

    fn add_polygon(&mut self, polygon: Arc<Polygon>) -> Result<(), SolverError>;

    fn has_free_capacity(&self) -> bool;

    /// Polygons loaded so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    /// Compute results for every loaded polygon, writing them into the polygons.
    fn solve(&mut self);
}

/// Hands out fresh, empty solvers. Called whenever the current solver of a
/// kind fills up.
pub trait SolverFactory: Send + Sync {
    fn create(&self, kind: ProblemKind) -> Box<dyn Solver>;
}

/// Storage and capacity bookkeeping shared by the reference solvers.
#[derive(Debug)]
struct Batch {
    polygons: Vec<Arc<Polygon>>,
    capacity: usize,
    solved: bool,
}

impl Batch {
    fn new(capacity: usize) -> Self {
        Self {
            polygons: Vec::with_capacity(capacity),
            capacity,
            solved: false,
        }
    }

    fn push(&mut self, polygon: Arc<Polygon>) -> Result<(), SolverError> {
        if self.solved {
            return Err(SolverError::AlreadySolved);
        }
        if self.polygons.len() >= self.capacity {
            return Err(SolverError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.polygons.push(polygon);
        Ok(())
    }

    fn has_free_capacity(&self) -> bool {
        !self.solved && self.polygons.len() < self.capacity
    }
}

/// Cheapest-triangulation solver.
#[derive(Debug)]
pub struct MinSolver {
    batch: Batch,
}

impl MinSolver {
    pub fn new(capacity: usize) -> Self {
        Self {
            batch: Batch::new(capacity),
        }
    }
}

impl Solver for MinSolver {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Min
    }

    fn add_polygon(&mut self, polygon: Arc<Polygon>) -> Result<(), SolverError> {
        self.batch.push(polygon)
    }

    fn has_free_capacity(&self) -> bool {
        self.batch.has_free_capacity()
    }

    fn len(&self) -> usize {
        self.batch.polygons.len()
    }

    fn capacity(&self) -> usize {
        self.batch.capacity
    }

    fn solve(&mut self) {
        for polygon in &self.batch.polygons {
            polygon.set_min_triangulation(geometry::min_triangulation(polygon.points()));
        }
        self.batch.solved = true;
    }
}

/// Triangulation-count solver.
#[derive(Debug)]
pub struct CntSolver {
    batch: Batch,
}

impl CntSolver {
    pub fn new(capacity: usize) -> Self {
        Self {
            batch: Batch::new(capacity),
        }
    }
}

impl Solver for CntSolver {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Cnt
    }

    fn add_polygon(&mut self, polygon: Arc<Polygon>) -> Result<(), SolverError> {
        self.batch.push(polygon)
    }

    fn has_free_capacity(&self) -> bool {
        self.batch.has_free_capacity()
    }

    fn len(&self) -> usize {
        self.batch.polygons.len()
    }

    fn capacity(&self) -> usize {
        self.batch.capacity
    }

    fn solve(&mut self) {
        for polygon in &self.batch.polygons {
            polygon.set_triangulation_count(geometry::triangulation_count(polygon.points().len()));
        }
        self.batch.solved = true;
    }
}

/// Factory for the bundled solvers, sized from an [`EngineConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ReferenceSolverFactory {
    min_capacity: usize,
    cnt_capacity: usize,
}

impl ReferenceSolverFactory {
    /// Both capacities must be positive.
    pub fn new(min_capacity: usize, cnt_capacity: usize) -> Result<Self, ConfigError> {
        if min_capacity == 0 {
            return Err(ConfigError::ZeroCapacity(ProblemKind::Min));
        }
        if cnt_capacity == 0 {
            return Err(ConfigError::ZeroCapacity(ProblemKind::Cnt));
        }
        Ok(Self {
            min_capacity,
            cnt_capacity,
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Self::new(config.min_capacity, config.cnt_capacity)
    }
}

impl Default for ReferenceSolverFactory {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            min_capacity: config.min_capacity,
            cnt_capacity: config.cnt_capacity,
        }
    }
}

impl SolverFactory for ReferenceSolverFactory {
    fn create(&self, kind: ProblemKind) -> Box<dyn Solver> {
        match kind {
            ProblemKind::Min => Box::new(MinSolver::new(self.min_capacity)),
            ProblemKind::Cnt => Box::new(CntSolver::new(self.cnt_capacity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Point;

    fn triangle() -> Arc<Polygon> {
        Arc::new(Polygon::new(vec![
            Point::new(0, 0),
            Point::new(3, 0),
            Point::new(0, 4),
        ]))
    }

    #[test]
    fn fills_to_capacity_then_refuses() {
        let mut solver = MinSolver::new(2);
        assert!(solver.has_free_capacity());
        solver.add_polygon(triangle()).expect("first add");
        solver.add_polygon(triangle()).expect("second add");
        assert!(!solver.has_free_capacity());
        assert_eq!(
            solver.add_polygon(triangle()),
            Err(SolverError::CapacityExceeded { capacity: 2 })
        );
        assert_eq!(solver.len(), 2);
    }

    #[test]
    fn solve_writes_results_in_place() {
        let polygon = triangle();
        let mut min = MinSolver::new(4);
        let mut cnt = CntSolver::new(4);
        min.add_polygon(polygon.clone()).expect("add min");
        cnt.add_polygon(polygon.clone()).expect("add cnt");

        min.solve();
        let cost = polygon.min_triangulation().expect("min result");
        assert!((cost - 12.0).abs() < 1e-9);
        assert_eq!(polygon.triangulation_count(), None);

        cnt.solve();
        assert_eq!(polygon.triangulation_count(), Some(1));
    }

    #[test]
    fn solved_solver_is_closed() {
        let mut solver = CntSolver::new(4);
        solver.add_polygon(triangle()).expect("add");
        solver.solve();
        assert!(!solver.has_free_capacity());
        assert_eq!(
            solver.add_polygon(triangle()),
            Err(SolverError::AlreadySolved)
        );
    }

    #[test]
    fn factory_builds_matching_kinds() {
        let factory = ReferenceSolverFactory::new(3, 5).expect("capacities");
        let min = factory.create(ProblemKind::Min);
        let cnt = factory.create(ProblemKind::Cnt);
        assert_eq!((min.kind(), min.capacity()), (ProblemKind::Min, 3));
        assert_eq!((cnt.kind(), cnt.capacity()), (ProblemKind::Cnt, 5));
        assert!(min.is_empty());
    }

    #[test]
    fn factory_rejects_zero_capacity() {
        assert_eq!(
            ReferenceSolverFactory::new(0, 4).map(|_| ()),
            Err(ConfigError::ZeroCapacity(ProblemKind::Min))
        );
        assert_eq!(
            ReferenceSolverFactory::new(4, 0).map(|_| ()),
            Err(ConfigError::ZeroCapacity(ProblemKind::Cnt))
        );
        let config = EngineConfig {
            min_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(ReferenceSolverFactory::from_config(&config).is_err());
    }
}
