//! Problem and pack model.
//!
//! A [`ProblemPack`] is what a company submits: an ordered list of polygons,
//! each tagged with the computation it needs. Polygons are shared (`Arc`) with
//! the solver they are loaded into; the solver writes results back in place.

use std::fmt;
use std::sync::{Arc, OnceLock};

/// Which computation a problem asks for. Each kind has its own solver type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    /// Cheapest triangulation.
    Min,
    /// Number of distinct triangulations.
    Cnt,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; 2] = [ProblemKind::Min, ProblemKind::Cnt];

    pub(crate) fn index(self) -> usize {
        match self {
            ProblemKind::Min => 0,
            ProblemKind::Cnt => 1,
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemKind::Min => write!(f, "min"),
            ProblemKind::Cnt => write!(f, "cnt"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// A polygon given by its vertices in order. Results are set at most once,
/// by whichever solver the polygon was loaded into.
#[derive(Debug, Default)]
pub struct Polygon {
    points: Vec<Point>,
    min_triangulation: OnceLock<f64>,
    triangulation_count: OnceLock<u128>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    pub fn add(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn min_triangulation(&self) -> Option<f64> {
        self.min_triangulation.get().copied()
    }

    pub fn triangulation_count(&self) -> Option<u128> {
        self.triangulation_count.get().copied()
    }

    /// Returns false if a result was already recorded.
    pub fn set_min_triangulation(&self, cost: f64) -> bool {
        self.min_triangulation.set(cost).is_ok()
    }

    pub fn set_triangulation_count(&self, count: u128) -> bool {
        self.triangulation_count.set(count).is_ok()
    }

    pub fn is_solved(&self, kind: ProblemKind) -> bool {
        match kind {
            ProblemKind::Min => self.min_triangulation.get().is_some(),
            ProblemKind::Cnt => self.triangulation_count.get().is_some(),
        }
    }
}

/// One unit of work: a polygon and the computation it needs.
#[derive(Debug, Clone)]
pub enum Problem {
    Min(Arc<Polygon>),
    Cnt(Arc<Polygon>),
}

impl Problem {
    pub fn kind(&self) -> ProblemKind {
        match self {
            Problem::Min(_) => ProblemKind::Min,
            Problem::Cnt(_) => ProblemKind::Cnt,
        }
    }

    pub fn polygon(&self) -> &Arc<Polygon> {
        match self {
            Problem::Min(polygon) | Problem::Cnt(polygon) => polygon,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.polygon().is_solved(self.kind())
    }
}

/// A batch of problems submitted by one company in one call.
#[derive(Debug, Default)]
pub struct ProblemPack {
    problems: Vec<Problem>,
}

impl ProblemPack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_min(&mut self, polygon: Arc<Polygon>) -> &mut Self {
        self.problems.push(Problem::Min(polygon));
        self
    }

    pub fn add_cnt(&mut self, polygon: Arc<Polygon>) -> &mut Self {
        self.problems.push(Problem::Cnt(polygon));
        self
    }

    pub fn push(&mut self, problem: Problem) -> &mut Self {
        self.problems.push(problem);
        self
    }

    /// Problems in submission order.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn count(&self, kind: ProblemKind) -> usize {
        self.problems.iter().filter(|p| p.kind() == kind).count()
    }

    pub fn is_solved(&self) -> bool {
        self.problems.iter().all(Problem::is_solved)
    }
}
