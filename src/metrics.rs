#[cfg(feature = "metrics")]
mod imp {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    // Throughput (cumulative)
    static PACKS_RECEIVED: AtomicU64 = AtomicU64::new(0);
    static PACKS_DELIVERED: AtomicU64 = AtomicU64::new(0);
    static POLYGONS_SOLVED: AtomicU64 = AtomicU64::new(0);
    // Solvers closed because they filled up vs. flushed half-empty at shutdown
    static SOLVERS_DISPATCHED: AtomicU64 = AtomicU64::new(0);
    static SOLVERS_FORCED: AtomicU64 = AtomicU64::new(0);
    // Gauges
    static QUEUE_OCC: AtomicUsize = AtomicUsize::new(0);
    static QUEUE_MAX_OCC: AtomicUsize = AtomicUsize::new(0);
    static PENDING_PACKS: AtomicUsize = AtomicUsize::new(0);
    static PENDING_MAX: AtomicUsize = AtomicUsize::new(0);

    #[derive(Clone, Copy, Debug)]
    pub struct MetricsSnapshot {
        pub packs_received: u64,
        pub packs_delivered: u64,
        pub polygons_solved: u64,
        pub solvers_dispatched: u64,
        pub solvers_forced: u64,
        pub queue_occ: usize,
        pub queue_max_occ: usize,
        pub pending_packs: usize,
        pub pending_max: usize,
    }

    fn update_max(target: &AtomicUsize, value: usize) {
        let mut prev = target.load(Ordering::Relaxed);
        while value > prev {
            match target.compare_exchange_weak(prev, value, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(next) => prev = next,
            }
        }
    }

    pub fn inc_packs_received() {
        PACKS_RECEIVED.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_packs_delivered() {
        PACKS_DELIVERED.fetch_add(1, Ordering::Relaxed);
        PENDING_PACKS.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn add_polygons_solved(count: usize) {
        POLYGONS_SOLVED.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn inc_solvers_dispatched() {
        SOLVERS_DISPATCHED.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_solvers_forced() {
        SOLVERS_FORCED.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_queue_occ() {
        let v = QUEUE_OCC.fetch_add(1, Ordering::Relaxed) + 1;
        update_max(&QUEUE_MAX_OCC, v);
    }

    pub fn dec_queue_occ() {
        QUEUE_OCC.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn inc_pending_packs() {
        let v = PENDING_PACKS.fetch_add(1, Ordering::Relaxed) + 1;
        update_max(&PENDING_MAX, v);
    }

    pub fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            packs_received: PACKS_RECEIVED.load(Ordering::Relaxed),
            packs_delivered: PACKS_DELIVERED.load(Ordering::Relaxed),
            polygons_solved: POLYGONS_SOLVED.load(Ordering::Relaxed),
            solvers_dispatched: SOLVERS_DISPATCHED.load(Ordering::Relaxed),
            solvers_forced: SOLVERS_FORCED.load(Ordering::Relaxed),
            queue_occ: QUEUE_OCC.load(Ordering::Relaxed),
            queue_max_occ: QUEUE_MAX_OCC.load(Ordering::Relaxed),
            pending_packs: PENDING_PACKS.load(Ordering::Relaxed),
            pending_max: PENDING_MAX.load(Ordering::Relaxed),
        }
    }

    pub fn spawn_reporter() {
        const INTERVAL_SECS: u64 = 10;
        std::thread::spawn(|| {
            let mut last_snap = snapshot();
            loop {
                std::thread::sleep(Duration::from_secs(INTERVAL_SECS));
                let snap = snapshot();
                tracing::info!(
                    interval_secs = INTERVAL_SECS,
                    received = snap.packs_received.saturating_sub(last_snap.packs_received),
                    delivered = snap.packs_delivered.saturating_sub(last_snap.packs_delivered),
                    polygons = snap.polygons_solved.saturating_sub(last_snap.polygons_solved),
                    dispatched = snap
                        .solvers_dispatched
                        .saturating_sub(last_snap.solvers_dispatched),
                    forced = snap.solvers_forced.saturating_sub(last_snap.solvers_forced),
                    queue = snap.queue_occ,
                    queue_max = snap.queue_max_occ,
                    pending = snap.pending_packs,
                    pending_max = snap.pending_max,
                    "metrics delta"
                );
                last_snap = snap;
            }
        });
    }
}

#[cfg(not(feature = "metrics"))]
#[allow(dead_code)]
mod imp {
    #[derive(Clone, Copy, Debug)]
    pub struct MetricsSnapshot {
        pub packs_received: u64,
        pub packs_delivered: u64,
        pub polygons_solved: u64,
        pub solvers_dispatched: u64,
        pub solvers_forced: u64,
        pub queue_occ: usize,
        pub queue_max_occ: usize,
        pub pending_packs: usize,
        pub pending_max: usize,
    }

    pub fn inc_packs_received() {}
    pub fn inc_packs_delivered() {}
    pub fn add_polygons_solved(_: usize) {}
    pub fn inc_solvers_dispatched() {}
    pub fn inc_solvers_forced() {}
    pub fn inc_queue_occ() {}
    pub fn dec_queue_occ() {}
    pub fn inc_pending_packs() {}
    pub fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            packs_received: 0,
            packs_delivered: 0,
            polygons_solved: 0,
            solvers_dispatched: 0,
            solvers_forced: 0,
            queue_occ: 0,
            queue_max_occ: 0,
            pending_packs: 0,
            pending_max: 0,
        }
    }
    pub fn spawn_reporter() {}
}

pub use imp::*;
