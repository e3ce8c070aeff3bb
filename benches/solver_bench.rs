//! Benchmark: reference solvers alone (no threads), full solver per iteration.

use std::hint::black_box;
use std::sync::Arc;
use std::time::{Duration, Instant};

use packflow::{Point, Polygon, ProblemKind, ReferenceSolverFactory, SolverFactory};

const CAPACITY: usize = 64;
const VERTICES: usize = 24;

fn regular_polygon(vertices: usize, radius: f64) -> Polygon {
    Polygon::new(
        (0..vertices)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / vertices as f64;
                Point::new((radius * a.cos()) as i32, (radius * a.sin()) as i32)
            })
            .collect(),
    )
}

fn bench(kind: ProblemKind) {
    let factory = ReferenceSolverFactory::new(CAPACITY, CAPACITY).expect("capacities");
    const TARGET_DURATION: Duration = Duration::from_secs(2);

    let start = Instant::now();
    let mut iterations: u64 = 0;
    while start.elapsed() < TARGET_DURATION {
        let mut solver = factory.create(kind);
        while solver.has_free_capacity() {
            let polygon = Arc::new(regular_polygon(VERTICES, 1000.0));
            solver
                .add_polygon(polygon)
                .expect("solver reported free capacity");
        }
        solver.solve();
        black_box(&solver);
        iterations += 1;
    }

    let elapsed = start.elapsed();
    let polygons = iterations * CAPACITY as u64;
    eprintln!(
        "{} solver: {} polygons ({} vertices) in {:?}  {:.0} polygons/s",
        kind,
        polygons,
        VERTICES,
        elapsed,
        polygons as f64 / elapsed.as_secs_f64()
    );
}

fn main() {
    bench(ProblemKind::Min);
    bench(ProblemKind::Cnt);
}
