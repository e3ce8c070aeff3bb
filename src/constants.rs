/// Polygons handed to a single min-cost solver before it is closed and dispatched.
pub const DEFAULT_MIN_SOLVER_CAPACITY: usize = 16;

/// Polygons handed to a single count solver before it is closed and dispatched.
pub const DEFAULT_CNT_SOLVER_CAPACITY: usize = 16;

pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Upper bound on the worker pool. Each company adds two more threads on top.
pub const MAX_WORKER_THREADS: usize = 256;

/// Fewer points than this cannot be triangulated; such polygons solve to zero.
pub const MIN_POLYGON_POINTS: usize = 3;

const _: () = assert!(
    DEFAULT_MIN_SOLVER_CAPACITY > 0 && DEFAULT_CNT_SOLVER_CAPACITY > 0,
    "solver capacity must be positive"
);
const _: () = assert!(
    DEFAULT_WORKER_THREADS > 0 && DEFAULT_WORKER_THREADS <= MAX_WORKER_THREADS,
    "default worker count out of range"
);
