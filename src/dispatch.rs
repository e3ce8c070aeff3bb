//! Dispatch queue and the two "current" solvers shared by all intake threads.
//!
//! One mutex guards the current min/cnt solvers, the queue of closed solvers
//! waiting for a worker, and the number of companies still submitting. One
//! condvar wakes workers when a solver is queued or the last company finishes.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::company::CompanyId;
use crate::metrics;
use crate::problem::{Problem, ProblemKind};
use crate::solver::{Solver, SolverFactory};
use crate::tracker::{Contribution, PackKey};

/// A solver plus the record of which packs put how many problems into it.
pub struct SolverBatch {
    id: u64,
    solver: Box<dyn Solver>,
    contributions: Vec<Contribution>,
}

impl SolverBatch {
    pub fn new(id: u64, solver: Box<dyn Solver>) -> Self {
        Self {
            id,
            solver,
            contributions: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ProblemKind {
        self.solver.kind()
    }

    pub fn len(&self) -> usize {
        self.solver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solver.is_empty()
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Run the solver, handing back the contributions to credit.
    pub fn solve(mut self) -> Vec<Contribution> {
        self.solver.solve();
        metrics::add_polygons_solved(self.solver.len());
        self.contributions
    }
}

struct DispatchState {
    current: [Option<SolverBatch>; 2],
    queue: VecDeque<SolverBatch>,
    active_producers: usize,
    next_batch_id: u64,
}

impl DispatchState {
    fn current(&mut self, kind: ProblemKind, factory: &dyn SolverFactory) -> &mut SolverBatch {
        let next_id = &mut self.next_batch_id;
        self.current[kind.index()].get_or_insert_with(|| {
            let batch = SolverBatch::new(*next_id, factory.create(kind));
            *next_id += 1;
            batch
        })
    }

    /// Move the current solver of `kind` onto the queue. Empty solvers are
    /// dropped instead. Returns true if something was queued.
    fn close(&mut self, kind: ProblemKind) -> bool {
        match self.current[kind.index()].take() {
            Some(batch) if !batch.is_empty() => {
                debug!(
                    batch = batch.id(),
                    %kind,
                    problems = batch.len(),
                    packs = batch.contributions().len(),
                    "solver closed"
                );
                self.queue.push_back(batch);
                metrics::inc_queue_occ();
                true
            }
            _ => false,
        }
    }
}

pub struct Dispatcher {
    factory: Arc<dyn SolverFactory>,
    state: Mutex<DispatchState>,
    available: Condvar,
}

impl Dispatcher {
    pub fn new(factory: Arc<dyn SolverFactory>, producers: usize) -> Self {
        Self {
            factory,
            state: Mutex::new(DispatchState {
                current: [None, None],
                queue: VecDeque::new(),
                active_producers: producers,
                next_batch_id: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// Spread one pack's problems over the current solvers, closing and
    /// queueing every solver that fills up. Returns the number of solvers queued.
    ///
    /// Every problem ends up in exactly one contribution, so the pack's
    /// contributions always add up to its size.
    pub fn load_pack(&self, company: CompanyId, pack: PackKey, problems: &[Problem]) -> usize {
        let mut state = self.state.lock();
        let mut pending = [0usize; 2];
        let mut queued = 0;

        for problem in problems {
            let kind = problem.kind();
            let slot = kind.index();
            let batch = state.current(kind, self.factory.as_ref());
            batch
                .solver
                .add_polygon(Arc::clone(problem.polygon()))
                .expect("current solver must have free capacity");
            pending[slot] += 1;

            if !batch.solver.has_free_capacity() {
                batch.contributions.push(Contribution {
                    company,
                    pack,
                    count: pending[slot],
                });
                pending[slot] = 0;
                if state.close(kind) {
                    metrics::inc_solvers_dispatched();
                    queued += 1;
                }
            }
        }

        // Leftovers stay in the open solvers, shared with later packs.
        for kind in ProblemKind::ALL {
            let count = pending[kind.index()];
            if count > 0 {
                state
                    .current(kind, self.factory.as_ref())
                    .contributions
                    .push(Contribution {
                        company,
                        pack,
                        count,
                    });
            }
        }
        drop(state);

        if queued > 0 {
            self.available.notify_all();
        }
        queued
    }

    /// Note that one company has run out of packs. The last one to finish
    /// flushes both partially filled solvers. Returns true for the last one.
    pub fn producer_finished(&self) -> bool {
        let mut state = self.state.lock();
        state.active_producers = state.active_producers.saturating_sub(1);
        let last = state.active_producers == 0;
        if last {
            for kind in ProblemKind::ALL {
                if state.close(kind) {
                    metrics::inc_solvers_forced();
                }
            }
            debug!(queued = state.queue.len(), "all companies finished");
        }
        drop(state);
        self.available.notify_all();
        last
    }

    /// Block until a closed solver is available. `None` once every company
    /// has finished and the queue is drained.
    pub fn next_batch(&self) -> Option<SolverBatch> {
        let mut state = self.state.lock();
        loop {
            if let Some(batch) = state.queue.pop_front() {
                metrics::dec_queue_occ();
                return Some(batch);
            }
            if state.active_producers == 0 {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn active_producers(&self) -> usize {
        self.state.lock().active_producers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Point, Polygon, ProblemPack};
    use crate::solver::ReferenceSolverFactory;
    use crate::tracker::PackTracker;

    fn pack(min: usize, cnt: usize) -> ProblemPack {
        let polygon = Arc::new(Polygon::new(vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(0, 1),
        ]));
        let mut pack = ProblemPack::new();
        for _ in 0..min {
            pack.add_min(polygon.clone());
        }
        for _ in 0..cnt {
            pack.add_cnt(polygon.clone());
        }
        pack
    }

    fn dispatcher(capacity: usize, producers: usize) -> Dispatcher {
        Dispatcher::new(
            Arc::new(ReferenceSolverFactory::new(capacity, capacity).expect("capacities")),
            producers,
        )
    }

    fn load(dispatcher: &Dispatcher, tracker: &mut PackTracker, pack: ProblemPack) -> PackKey {
        let problems = pack.problems().to_vec();
        let key = tracker.register(pack);
        dispatcher.load_pack(CompanyId(0), key, &problems);
        key
    }

    fn drain(dispatcher: &Dispatcher) -> Vec<SolverBatch> {
        let mut out = Vec::new();
        while dispatcher.queued() > 0 {
            out.extend(dispatcher.next_batch());
        }
        out
    }

    #[test]
    fn solvers_close_at_capacity_boundaries() {
        // Packs of 5, 3 and 7 into capacity 4: closes after problems 4, 8 and 12.
        let d = dispatcher(4, 1);
        let mut tracker = PackTracker::new();
        let p1 = load(&d, &mut tracker, pack(5, 0));
        assert_eq!(d.queued(), 1);
        let p2 = load(&d, &mut tracker, pack(3, 0));
        assert_eq!(d.queued(), 2);
        let p3 = load(&d, &mut tracker, pack(7, 0));
        assert_eq!(d.queued(), 3);

        let batches = drain(&d);
        let shape: Vec<Vec<(u64, usize)>> = batches
            .iter()
            .map(|b| {
                b.contributions()
                    .iter()
                    .map(|c| (c.pack.seq(), c.count))
                    .collect()
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                vec![(p1.seq(), 4)],
                vec![(p1.seq(), 1), (p2.seq(), 3)],
                vec![(p3.seq(), 4)],
            ]
        );

        // Three problems of pack 3 remain in the open solver until the flush.
        assert!(d.producer_finished());
        let flushed = drain(&d);
        assert_eq!(flushed.len(), 1);
        let expected = Contribution {
            company: CompanyId(0),
            pack: p3,
            count: 3,
        };
        assert_eq!(flushed[0].contributions(), &[expected]);
        assert!(d.next_batch().is_none());
    }

    #[test]
    fn kinds_fill_separate_solvers() {
        let d = dispatcher(2, 1);
        let mut tracker = PackTracker::new();
        let key = load(&d, &mut tracker, pack(2, 1));

        let batches = drain(&d);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].kind(), ProblemKind::Min);

        d.producer_finished();
        let flushed = drain(&d);
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].kind(), ProblemKind::Cnt);
        assert_eq!(flushed[0].contributions()[0].pack, key);
    }

    #[test]
    fn only_last_producer_flushes() {
        let d = dispatcher(10, 2);
        let mut tracker = PackTracker::new();
        load(&d, &mut tracker, pack(1, 1));

        assert!(!d.producer_finished());
        assert_eq!(d.queued(), 0);
        assert!(d.producer_finished());
        assert_eq!(d.queued(), 2);
        assert_eq!(d.active_producers(), 0);
    }

    #[test]
    fn flush_with_nothing_open_queues_nothing() {
        let d = dispatcher(3, 1);
        assert!(d.producer_finished());
        assert_eq!(d.queued(), 0);
        assert!(d.next_batch().is_none());
    }

    #[test]
    fn contributions_cover_every_problem() {
        let d = dispatcher(3, 1);
        let mut tracker = PackTracker::new();
        let sizes = [(4, 2), (0, 5), (1, 1), (7, 0)];
        for (min, cnt) in sizes {
            load(&d, &mut tracker, pack(min, cnt));
        }
        d.producer_finished();

        let mut per_pack = [0usize; 4];
        for batch in drain(&d) {
            assert!(batch.len() <= 3);
            let credited: usize = batch.contributions().iter().map(|c| c.count).sum();
            assert_eq!(credited, batch.len());
            for c in batch.contributions() {
                per_pack[c.pack.seq() as usize] += c.count;
            }
        }
        let expected: Vec<usize> = sizes.iter().map(|(m, c)| m + c).collect();
        assert_eq!(per_pack.to_vec(), expected);
    }
}
