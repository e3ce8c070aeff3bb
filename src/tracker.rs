//! Per-company pack bookkeeping.
//!
//! Every pack a company submits gets a slot in that company's arena and a
//! place in its submission queue. Workers add completed-problem counts to the
//! slot; the delivery thread only ever looks at the head of the queue, so
//! packs leave in submission order no matter which finishes first.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use slab::Slab;
use tracing::trace;

use crate::company::{Company, CompanyId};
use crate::metrics;
use crate::problem::ProblemPack;

/// Handle to a pending pack within its company's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackKey {
    slot: usize,
    seq: u64,
}

impl PackKey {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// "`count` problems of this company's pack live in one solver."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    pub company: CompanyId,
    pub pack: PackKey,
    pub count: usize,
}

#[derive(Debug)]
struct PendingPack {
    seq: u64,
    pack: ProblemPack,
    total: usize,
    completed: usize,
}

impl PendingPack {
    fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Arena of one company's in-flight packs plus its delivery cursor.
#[derive(Debug, Default)]
pub struct PackTracker {
    packs: Slab<PendingPack>,
    /// Slab slots in submission order; the front is at `cursor`.
    order: VecDeque<usize>,
    next_seq: u64,
    cursor: u64,
    /// The company will submit nothing more.
    closed: bool,
}

impl PackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a freshly submitted pack and assign its sequence number.
    pub fn register(&mut self, pack: ProblemPack) -> PackKey {
        let seq = self.next_seq;
        self.next_seq += 1;
        let total = pack.len();
        let slot = self.packs.insert(PendingPack {
            seq,
            pack,
            total,
            completed: 0,
        });
        self.order.push_back(slot);
        PackKey { slot, seq }
    }

    /// Add `count` solved problems to a pack. Returns true once the pack is complete.
    pub fn record(&mut self, key: PackKey, count: usize) -> bool {
        let entry = &mut self.packs[key.slot];
        debug_assert_eq!(entry.seq, key.seq, "stale pack key");
        entry.completed += count;
        debug_assert!(
            entry.completed <= entry.total,
            "pack {} over-completed: {}/{}",
            entry.seq,
            entry.completed,
            entry.total
        );
        entry.is_complete()
    }

    pub fn is_complete(&self, key: PackKey) -> bool {
        self.packs
            .get(key.slot)
            .is_some_and(|entry| entry.seq == key.seq && entry.is_complete())
    }

    pub fn head_ready(&self) -> bool {
        self.order
            .front()
            .is_some_and(|&slot| self.packs[slot].is_complete())
    }

    /// Remove and return the head pack if it is complete, advancing the cursor.
    pub fn pop_ready(&mut self) -> Option<ProblemPack> {
        if !self.head_ready() {
            return None;
        }
        let slot = self.order.pop_front()?;
        let entry = self.packs.remove(slot);
        debug_assert_eq!(entry.seq, self.cursor);
        self.cursor += 1;
        Some(entry.pack)
    }

    /// Packs registered but not yet delivered.
    pub fn pending(&self) -> usize {
        self.order.len()
    }

    /// Sequence number of the next pack to deliver.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Closed and nothing left to deliver.
    pub fn is_drained(&self) -> bool {
        self.closed && self.order.is_empty()
    }
}

/// A registered company together with its tracker and the condvar its
/// delivery thread sleeps on.
pub struct CompanyLane {
    id: CompanyId,
    company: Arc<dyn Company>,
    pub(crate) tracker: Mutex<PackTracker>,
    pub(crate) ready: Condvar,
}

impl CompanyLane {
    pub fn new(id: CompanyId, company: Arc<dyn Company>) -> Self {
        Self {
            id,
            company,
            tracker: Mutex::new(PackTracker::new()),
            ready: Condvar::new(),
        }
    }

    pub fn id(&self) -> CompanyId {
        self.id
    }

    pub fn company(&self) -> &Arc<dyn Company> {
        &self.company
    }

    /// Register a pack for ordered delivery. An empty pack is complete
    /// immediately, so its waiter is woken here.
    pub fn register(&self, pack: ProblemPack) -> PackKey {
        let mut tracker = self.tracker.lock();
        let key = tracker.register(pack);
        metrics::inc_pending_packs();
        if tracker.is_complete(key) {
            self.ready.notify_all();
        }
        key
    }

    /// Credit a solver's contribution to its pack.
    pub fn complete(&self, contribution: &Contribution) {
        debug_assert_eq!(contribution.company, self.id);
        let mut tracker = self.tracker.lock();
        if tracker.record(contribution.pack, contribution.count) {
            trace!(
                company = %self.id,
                seq = contribution.pack.seq(),
                "pack complete"
            );
            self.ready.notify_all();
        }
    }

    /// Mark the company as done submitting.
    pub fn close(&self) {
        let mut tracker = self.tracker.lock();
        tracker.close();
        self.ready.notify_all();
    }

    /// Wake the delivery thread so it re-checks its exit condition.
    pub fn wake(&self) {
        let _tracker = self.tracker.lock();
        self.ready.notify_all();
    }
}
