/*

    Bounding volume hierarchy, the object-partitioning alternative to the KD-tree.

    Every primitive lands in exactly one leaf, so the primitive array is a
    permutation of the input. Node boxes are the union of their contents and
    siblings may overlap. Nodes use the same flattened layout as the KD-tree,
    so both are traversed and uploaded by the same code.

    @date: 12 Nov, 2025
    @author: bartu
*/

use crate::aabb::{Aabb, Bounded};
use crate::acceleration::{prepare, Accelerator, FlatIndex};
use crate::config::IndexConfig;
use crate::prelude::*;

/// Depth bound of the BVH; `IndexConfig::max_depth` only limits the KD-tree.
pub const BVH_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct Bvh<T> {
    flat: FlatIndex<T>,
}

impl<T: Bounded + Clone + Send + Sync> Accelerator<T> for Bvh<T> {
    fn flat(&self) -> &FlatIndex<T> {
        &self.flat
    }

    fn kind(&self) -> &'static str {
        "bvh"
    }
}

impl<T: Bounded + Clone + Send + Sync> Bvh<T> {
    /// Split at the median centroid along the longest axis of the centroid bounds.
    pub fn build(primitives: &[T], config: &IndexConfig) -> Result<Self> {
        let span = tracing::span!(tracing::Level::INFO, "build_bvh", primitives = primitives.len());
        let _enter = span.enter();

        let bounds = prepare(primitives, config)?;
        let centroids: Vec<Vector3> = bounds.iter().map(Aabb::centroid).collect();

        let mut flat = FlatIndex::with_capacity(primitives.len());
        let mut items: Vec<u32> = (0..primitives.len() as u32).collect();
        let root = subdivide(&mut flat, primitives, &bounds, &centroids, &mut items, config.node_size, 0)?;
        debug_assert_eq!(root, 0, "root must be the first node");

        let bvh = Self { flat };
        let stats = bvh.stats();
        info!(
            "Built bvh: {} nodes ({} leaves), depth {}, {} primitives",
            stats.nodes, stats.leaves, stats.depth, stats.primitive_refs
        );
        Ok(bvh)
    }
}

fn subdivide<T: Clone>(
    flat: &mut FlatIndex<T>,
    input: &[T],
    bounds: &[Aabb],
    centroids: &[Vector3],
    items: &mut [u32],
    node_size: usize,
    depth: usize,
) -> Result<u32> {
    let node_bounds = Aabb::union_all(items.iter().map(|&i| &bounds[i as usize]));

    if items.len() <= node_size || depth >= BVH_MAX_DEPTH {
        return flat.push_leaf(node_bounds, input, items);
    }

    let centroid_bounds = Aabb::from_points(&items.iter().map(|&i| centroids[i as usize]).collect::<Vec<_>>());
    let axis = centroid_bounds.longest_axis();

    // stable: equal centroids keep input order
    items.sort_by(|&a, &b| centroids[a as usize][axis].total_cmp(&centroids[b as usize][axis]));
    let mid = items.len() / 2;

    let id = flat.reserve(node_bounds);
    let (left_items, right_items) = items.split_at_mut(mid);
    let left = subdivide(flat, input, bounds, centroids, left_items, node_size, depth + 1)?;
    let right = subdivide(flat, input, bounds, centroids, right_items, node_size, depth + 1)?;
    flat.link(id, left, right);
    Ok(id)
}
