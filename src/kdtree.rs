/*

    KD-tree over bounded primitives.

    Space is cut, not objects: every node's box is the box its
    parent handed down, halved on one axis. A primitive whose
    bounds straddle the cut goes to both children, its geometry
    is never clipped. Split axes rotate X, Y, Z with depth.

    Recursion stops at `node_size` primitives or at `max_depth`,
    whichever comes first; a leaf that is still larger than
    `node_size` at that point is accepted as is. A cut that
    would leave every primitive on one of its sides is not
    made, the next axis is tried on the same box one level
    deeper.

    @author: bartu
    @date: 9 Nov, 2025
*/

use crate::aabb::{Aabb, Bounded};
use crate::acceleration::{prepare, Accelerator, FlatIndex};
use crate::config::{IndexConfig, SplitHeuristic};
use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct KdTree<T> {
    flat: FlatIndex<T>,
    config: IndexConfig,
}

impl<T: Bounded + Clone + Send + Sync> Accelerator<T> for KdTree<T> {
    fn flat(&self) -> &FlatIndex<T> {
        &self.flat
    }

    fn kind(&self) -> &'static str {
        "kd-tree"
    }
}

impl<T: Bounded + Clone + Send + Sync> KdTree<T> {
    /// Build the tree from `primitives`. Fails before touching any node
    /// if the config or an input bound is unusable.
    pub fn build(primitives: &[T], config: &IndexConfig) -> Result<Self> {
        let span = tracing::span!(tracing::Level::INFO, "build_kdtree", primitives = primitives.len());
        let _enter = span.enter();

        let bounds = prepare(primitives, config)?;
        let root_bounds = Aabb::union_all(&bounds);

        let mut builder = KdBuilder {
            input: primitives,
            bounds: &bounds,
            config,
            flat: FlatIndex::with_capacity(primitives.len()),
            oversized_leaves: 0,
            skipped_cuts: 0,
            dropped: 0,
        };

        let all: Vec<u32> = (0..primitives.len() as u32).collect();
        let root = builder.subdivide(&all, root_bounds, 0)?;
        debug_assert_eq!(root, 0, "root must be the first node");

        if builder.dropped > 0 {
            warn!("{} primitive references matched neither child box and were dropped", builder.dropped);
        }
        if builder.skipped_cuts > 0 {
            debug!("{} cuts kept every primitive on one side and were moved to the next axis", builder.skipped_cuts);
        }
        if builder.oversized_leaves > 0 {
            debug!("{} leaves exceed NodeSize={} at MaxDepth={}", builder.oversized_leaves, config.node_size, config.max_depth);
        }

        let tree = Self { flat: builder.flat, config: config.clone() };
        let stats = tree.stats();
        info!(
            "Built kd-tree: {} nodes ({} leaves), {} references to {} primitives (x{:.2})",
            stats.nodes, stats.leaves, stats.primitive_refs, stats.source_primitives, stats.duplication_ratio()
        );
        Ok(tree)
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }
}

struct KdBuilder<'a, T> {
    input: &'a [T],
    bounds: &'a [Aabb],
    config: &'a IndexConfig,
    flat: FlatIndex<T>,
    oversized_leaves: usize,
    skipped_cuts: usize,
    dropped: usize,
}

impl<T: Bounded + Clone> KdBuilder<'_, T> {
    /// Returns the id of the node built for `items` inside `node_bounds`.
    fn subdivide(&mut self, items: &[u32], node_bounds: Aabb, depth: usize) -> Result<u32> {
        if items.len() <= self.config.node_size || depth >= self.config.max_depth {
            if items.len() > self.config.node_size {
                self.oversized_leaves += 1;
            }
            // keep the box handed down, not the tighter bound of the contents
            return self.flat.push_leaf(node_bounds, self.input, items);
        }

        let axis = depth % AXES;
        let boundary = self.split_boundary(items, &node_bounds, axis);
        let left_bounds = node_bounds.with_max(axis, boundary);
        let right_bounds = node_bounds.with_min(axis, boundary);

        let mut left_items = Vec::with_capacity(items.len());
        let mut right_items = Vec::with_capacity(items.len());
        for &item in items {
            let b = &self.bounds[item as usize];
            let in_left = left_bounds.overlaps(b);
            let in_right = right_bounds.overlaps(b);
            if in_left {
                left_items.push(item);
            }
            if in_right {
                right_items.push(item);
            }
            if !in_left && !in_right {
                self.dropped += 1;
            }
        }

        // a side that keeps every primitive is no smaller than this node;
        // try the next axis on the same box instead
        if left_items.len() == items.len() || right_items.len() == items.len() {
            self.skipped_cuts += 1;
            return self.subdivide(items, node_bounds, depth + 1);
        }

        let id = self.flat.reserve(node_bounds);
        let left = self.subdivide(&left_items, left_bounds, depth + 1)?;
        let right = self.subdivide(&right_items, right_bounds, depth + 1)?;
        self.flat.link(id, left, right);
        Ok(id)
    }

    /// Position of the cutting plane on `axis`, kept inside the node's box.
    fn split_boundary(&self, items: &[u32], node_bounds: &Aabb, axis: usize) -> Float {
        let extent = node_bounds.axis(axis);
        let boundary = match self.config.split {
            SplitHeuristic::Midpoint => (extent.min + extent.max) * 0.5,
            SplitHeuristic::Median => {
                // stable sort keeps input order among equal keys
                let mut sorted = items.to_vec();
                sorted.sort_by(|&a, &b| self.min_on(a, axis).total_cmp(&self.min_on(b, axis)));
                self.min_on(sorted[sorted.len() / 2], axis)
            }
        };
        boundary.max(extent.min).min(extent.max)
    }

    fn min_on(&self, item: u32, axis: usize) -> Float {
        self.bounds[item as usize].min[axis]
    }
}
