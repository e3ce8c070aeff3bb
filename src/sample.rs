//! Synthetic company for demos, benchmarks and tests.
//!
//! Hands out a fixed number of packs of random convex polygons and checks
//! that every pack comes back once, in order, with every problem solved.

use std::collections::HashMap;
use std::f64::consts::TAU;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::company::Company;
use crate::geometry;
use crate::problem::{Point, Polygon, Problem, ProblemPack};

/// Contents of a pack: the addresses of its polygons, in order.
type Fingerprint = Vec<usize>;

fn fingerprint(pack: &ProblemPack) -> Fingerprint {
    pack.problems()
        .iter()
        .map(|p| Arc::as_ptr(p.polygon()) as usize)
        .collect()
}

/// Packs are never empty, and a polygon stays alive while its pack is out,
/// so the first polygon's address tells outstanding packs apart.
fn pack_key(pack: &ProblemPack) -> Option<usize> {
    pack.problems()
        .first()
        .map(|p| Arc::as_ptr(p.polygon()) as usize)
}

struct SampleState {
    rng: StdRng,
    remaining: usize,
    handed_out: usize,
    /// Hand-out index and contents of every pack not yet returned.
    outstanding: HashMap<usize, (usize, Fingerprint)>,
    delivered: Vec<usize>,
    returned: usize,
    errors: usize,
}

pub struct SampleCompany {
    max_problems: usize,
    max_vertices: usize,
    delay: Option<Duration>,
    state: Mutex<SampleState>,
}

impl SampleCompany {
    /// `packs` packs of 1 to `max_problems` problems each, generated from `seed`.
    pub fn new(seed: u64, packs: usize, max_problems: usize) -> Self {
        Self {
            max_problems,
            max_vertices: 12,
            delay: None,
            state: Mutex::new(SampleState {
                rng: StdRng::seed_from_u64(seed),
                remaining: packs,
                handed_out: 0,
                outstanding: HashMap::new(),
                delivered: Vec::new(),
                returned: 0,
                errors: 0,
            }),
        }
    }

    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = max_vertices.max(3);
        self
    }

    /// Sleep this long before handing out each pack.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every pack was handed out and came back correctly.
    pub fn all_processed(&self) -> bool {
        let state = self.state.lock();
        state.remaining == 0
            && state.outstanding.is_empty()
            && state.errors == 0
            && state.returned == state.handed_out
    }

    pub fn returned(&self) -> usize {
        self.state.lock().returned
    }

    pub fn errors(&self) -> usize {
        self.state.lock().errors
    }

    /// Hand-out index of each returned pack, in the order they came back.
    /// A correct run yields `0, 1, 2, ...`.
    pub fn delivered_order(&self) -> Vec<usize> {
        self.state.lock().delivered.clone()
    }

    fn random_polygon(rng: &mut StdRng, max_vertices: usize) -> Polygon {
        let vertices = rng.gen_range(3..=max_vertices);
        let radius = rng.gen_range(10.0..1000.0f64);
        let mut angles: Vec<f64> = (0..vertices).map(|_| rng.gen_range(0.0..TAU)).collect();
        angles.sort_by(f64::total_cmp);
        Polygon::new(
            angles
                .into_iter()
                .map(|a| {
                    Point::new(
                        (radius * a.cos()).round() as i32,
                        (radius * a.sin()).round() as i32,
                    )
                })
                .collect(),
        )
    }

    fn verify(problem: &Problem) -> bool {
        let polygon = problem.polygon();
        match problem {
            Problem::Min(_) => polygon.min_triangulation().is_some_and(|cost| {
                (cost - geometry::min_triangulation(polygon.points())).abs() <= 1e-6 * cost.max(1.0)
            }),
            Problem::Cnt(_) => {
                polygon.triangulation_count()
                    == Some(geometry::triangulation_count(polygon.points().len()))
            }
        }
    }
}

impl Company for SampleCompany {
    fn wait_for_pack(&self) -> Option<ProblemPack> {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        let mut state = self.state.lock();
        if state.remaining == 0 {
            return None;
        }
        state.remaining -= 1;

        let mut pack = ProblemPack::new();
        let problems = state.rng.gen_range(1..=self.max_problems.max(1));
        for _ in 0..problems {
            let polygon = Arc::new(Self::random_polygon(&mut state.rng, self.max_vertices));
            match state.rng.gen_range(0..3) {
                0 => pack.add_min(polygon),
                1 => pack.add_cnt(polygon),
                _ => pack.add_min(polygon.clone()).add_cnt(polygon),
            };
        }
        if let Some(key) = pack_key(&pack) {
            let index = state.handed_out;
            state.outstanding.insert(key, (index, fingerprint(&pack)));
        }
        state.handed_out += 1;
        Some(pack)
    }

    fn solved_pack(&self, pack: ProblemPack) {
        let mut state = self.state.lock();
        let expected_index = state.delivered.len();
        state.returned += 1;
        let issued = pack_key(&pack).and_then(|key| state.outstanding.remove(&key));
        let in_order = match issued {
            Some((index, contents)) => {
                state.delivered.push(index);
                index == expected_index && contents == fingerprint(&pack)
            }
            None => false,
        };
        let solved = pack.problems().iter().all(Self::verify);
        if !in_order || !solved {
            warn!(in_order, solved, returned = state.returned, "bad pack returned");
            state.errors += 1;
        }
    }
}
