//! Reference triangulation algorithms used by the bundled solvers.
//!
//! Polygons are treated as convex: every chord between two non-adjacent
//! vertices is a valid diagonal.

use crate::constants::MIN_POLYGON_POINTS;
use crate::problem::Point;

fn distance(a: Point, b: Point) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    dx.hypot(dy)
}

fn perimeter(a: Point, b: Point, c: Point) -> f64 {
    distance(a, b) + distance(b, c) + distance(c, a)
}

/// Cheapest triangulation, where a triangulation costs the sum of its
/// triangles' perimeters. O(n^3) interval DP.
pub fn min_triangulation(points: &[Point]) -> f64 {
    let n = points.len();
    if n < MIN_POLYGON_POINTS {
        return 0.0;
    }

    // cost[i][j]: cheapest triangulation of the sub-polygon i..=j.
    let mut cost = vec![vec![0.0f64; n]; n];
    for gap in 2..n {
        for i in 0..n - gap {
            let j = i + gap;
            let mut best = f64::INFINITY;
            for k in i + 1..j {
                let candidate =
                    cost[i][k] + cost[k][j] + perimeter(points[i], points[k], points[j]);
                if candidate < best {
                    best = candidate;
                }
            }
            cost[i][j] = best;
        }
    }
    cost[0][n - 1]
}

/// Number of triangulations of a convex polygon with `vertices` corners:
/// the Catalan number C(n - 2). Saturates at `u128::MAX`.
pub fn triangulation_count(vertices: usize) -> u128 {
    if vertices < MIN_POLYGON_POINTS {
        return 0;
    }
    let n = vertices - 2;
    let mut catalan = vec![0u128; n + 1];
    catalan[0] = 1;
    for i in 1..=n {
        let mut sum = 0u128;
        for j in 0..i {
            sum = sum.saturating_add(catalan[j].saturating_mul(catalan[i - 1 - j]));
        }
        catalan[i] = sum;
    }
    catalan[n]
}
