#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use packflow::error::SolverError;
use packflow::{
    Company, Point, Polygon, ProblemKind, ProblemPack, ReferenceSolverFactory, Solver,
    SolverFactory,
};

/// Triangle whose first vertex encodes `tag`, so a returned pack can be identified.
pub fn tagged_polygon(tag: i32) -> Arc<Polygon> {
    Arc::new(Polygon::new(vec![
        Point::new(tag, 0),
        Point::new(tag + 3, 0),
        Point::new(tag, 4),
    ]))
}

/// Pack `tag` with `min` cheapest-triangulation and `cnt` count problems.
pub fn tagged_pack(tag: i32, min: usize, cnt: usize) -> ProblemPack {
    let mut pack = ProblemPack::new();
    for _ in 0..min {
        pack.add_min(tagged_polygon(tag));
    }
    for _ in 0..cnt {
        pack.add_cnt(tagged_polygon(tag));
    }
    pack
}

pub fn pack_tag(pack: &ProblemPack) -> Option<i32> {
    pack.problems().first().map(|p| p.polygon().points()[0].x)
}

/// Company that hands out a fixed list of packs and records what comes back.
pub struct ScriptedCompany {
    packs: Mutex<VecDeque<ProblemPack>>,
    delay: Option<Duration>,
    delivered: Mutex<Vec<Option<i32>>>,
    unsolved: Mutex<usize>,
}

impl ScriptedCompany {
    /// One pack per `(min, cnt)` entry, tagged `tag_base + index`.
    pub fn new(tag_base: i32, shapes: &[(usize, usize)]) -> Arc<Self> {
        Self::build(tag_base, shapes, None)
    }

    pub fn with_delay(tag_base: i32, shapes: &[(usize, usize)], delay: Duration) -> Arc<Self> {
        Self::build(tag_base, shapes, Some(delay))
    }

    fn build(tag_base: i32, shapes: &[(usize, usize)], delay: Option<Duration>) -> Arc<Self> {
        let packs = shapes
            .iter()
            .enumerate()
            .map(|(i, &(min, cnt))| tagged_pack(tag_base + i as i32, min, cnt))
            .collect();
        Arc::new(Self {
            packs: Mutex::new(packs),
            delay,
            delivered: Mutex::new(Vec::new()),
            unsolved: Mutex::new(0),
        })
    }

    pub fn delivered(&self) -> Vec<Option<i32>> {
        self.delivered.lock().clone()
    }

    pub fn unsolved(&self) -> usize {
        *self.unsolved.lock()
    }
}

impl Company for ScriptedCompany {
    fn wait_for_pack(&self) -> Option<ProblemPack> {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.packs.lock().pop_front()
    }

    fn solved_pack(&self, pack: ProblemPack) {
        if !pack.is_solved() {
            *self.unsolved.lock() += 1;
        }
        self.delivered.lock().push(pack_tag(&pack));
    }
}

/// What a recording solver looked like when it was solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveRecord {
    pub solver: u64,
    pub kind: ProblemKind,
    pub len: usize,
    pub capacity: usize,
}

/// Wraps the reference solvers, logging each solve and optionally slowing
/// down the first solver created or panicking on solve.
pub struct RecordingFactory {
    inner: ReferenceSolverFactory,
    created: AtomicU64,
    records: Arc<Mutex<Vec<SolveRecord>>>,
    slow_first: Option<Duration>,
    panic_on_solve: bool,
}

impl RecordingFactory {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self::build(capacity, None, false))
    }

    pub fn slow_first(capacity: usize, delay: Duration) -> Arc<Self> {
        Arc::new(Self::build(capacity, Some(delay), false))
    }

    pub fn panicking(capacity: usize) -> Arc<Self> {
        Arc::new(Self::build(capacity, None, true))
    }

    fn build(capacity: usize, slow_first: Option<Duration>, panic_on_solve: bool) -> Self {
        Self {
            inner: ReferenceSolverFactory::new(capacity, capacity).expect("capacities"),
            created: AtomicU64::new(0),
            records: Arc::new(Mutex::new(Vec::new())),
            slow_first,
            panic_on_solve,
        }
    }

    pub fn records(&self) -> Vec<SolveRecord> {
        self.records.lock().clone()
    }
}

impl SolverFactory for RecordingFactory {
    fn create(&self, kind: ProblemKind) -> Box<dyn Solver> {
        let id = self.created.fetch_add(1, Ordering::Relaxed);
        Box::new(RecordingSolver {
            id,
            inner: self.inner.create(kind),
            records: Arc::clone(&self.records),
            delay: if id == 0 { self.slow_first } else { None },
            panic_on_solve: self.panic_on_solve,
        })
    }
}

struct RecordingSolver {
    id: u64,
    inner: Box<dyn Solver>,
    records: Arc<Mutex<Vec<SolveRecord>>>,
    delay: Option<Duration>,
    panic_on_solve: bool,
}

impl Solver for RecordingSolver {
    fn kind(&self) -> ProblemKind {
        self.inner.kind()
    }

    fn add_polygon(&mut self, polygon: Arc<Polygon>) -> Result<(), SolverError> {
        self.inner.add_polygon(polygon)
    }

    fn has_free_capacity(&self) -> bool {
        self.inner.has_free_capacity()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn solve(&mut self) {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.records.lock().push(SolveRecord {
            solver: self.id,
            kind: self.inner.kind(),
            len: self.inner.len(),
            capacity: self.inner.capacity(),
        });
        if self.panic_on_solve {
            panic!("solver {} failed", self.id);
        }
        self.inner.solve();
    }
}
