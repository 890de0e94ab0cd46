/*

    Cast batches of rays against an index.

    Each ray is independent, so a batch is split across
    the rayon pool. The index is only read, any number of
    batches can run against the same snapshot.

    @date: Oct 11, 2025
    @author: Bartu
*/

use rayon::prelude::*;

use crate::acceleration::{Accelerator, ExactQuery, Hit};
use crate::config::QueryMode;
use crate::geometry::Intersect;
use crate::interval::Interval;
use crate::ray::Ray;
use crate::shapes::Primitive;
use crate::prelude::*;

/// Per-ray answer, shaped by the query mode.
#[derive(Debug, Clone, PartialEq)]
pub enum CastResult {
    /// Input positions of the candidates, sorted and deduplicated.
    Candidates(Vec<u32>),
    Hit(Option<Hit>),
}

impl CastResult {
    pub fn hit(&self) -> Option<&Hit> {
        match self {
            CastResult::Hit(hit) => hit.as_ref(),
            CastResult::Candidates(_) => None,
        }
    }
}

pub fn cast_batch<A>(index: &A, rays: &[Ray], mode: QueryMode, epsilon: Float) -> Vec<CastResult>
where
    A: Accelerator<Primitive> + ?Sized,
{
    let t_interval = Interval::positive(epsilon);
    rays.par_iter()
        .map(|ray| match mode {
            QueryMode::AllCandidates => CastResult::Candidates(index.query_sources(ray)),
            QueryMode::ClosestHit => CastResult::Hit(index.closest_hit(ray, &t_interval)),
            QueryMode::AnyHit => CastResult::Hit(index.any_hit(ray, &t_interval)),
        })
        .collect()
}

/// Iterate over all primitives to find the closest hit. `slot` and
/// `source` of the result are both the input position.
pub fn hit_naive<T: Intersect>(ray: &Ray, t_interval: &Interval, primitives: &[T], early_break: bool) -> Option<Hit> {
    let mut range = *t_interval;
    let mut rec = None;
    for (i, prim) in primitives.iter().enumerate() {
        if let Some(t) = prim.intersect(ray, &range) {
            let hit = Hit { t, slot: i as u32, source: i as u32 };
            if early_break {
                return Some(hit);
            }
            range.max = t;
            rec = Some(hit);
        }
    }
    rec
}

/// Count rays whose indexed closest hit disagrees with the brute force one.
pub fn count_mismatches<A>(index: &A, primitives: &[Primitive], rays: &[Ray], epsilon: Float) -> usize
where
    A: Accelerator<Primitive> + ?Sized,
{
    let t_interval = Interval::positive(epsilon);
    rays.par_iter()
        .filter(|ray| {
            let indexed = index.closest_hit(ray, &t_interval).map(|h| h.t);
            let naive = hit_naive(ray, &t_interval, primitives, false).map(|h| h.t);
            match (indexed, naive) {
                (Some(a), Some(b)) => (a - b).abs() > epsilon,
                (None, None) => false,
                _ => true,
            }
        })
        .count()
}
