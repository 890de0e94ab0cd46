/*

    Flattened acceleration structure shared by the KD-tree
    and the BVH.

    Both builders emit the same two contiguous arrays:
    nodes, whose children are positions in the node array,
    and primitives, whose leaf ranges are [offset, offset + count).
    Node 0 is always the root. Once built, nothing here is
    ever mutated again, so queries only need &self.

    Traversal is iterative with an explicit stack of node
    indices; every query owns its stack.

    @author: bartu
    @date: 9 Nov, 2025
*/

use std::ops::Range;

use crate::aabb::{Aabb, Bounded};
use crate::config::IndexConfig;
use crate::geometry::Intersect;
use crate::interval::Interval;
use crate::ray::Ray;
use crate::prelude::*;

/// Marks a missing child (leaf) or the offset of an internal node.
pub const INVALID: u32 = u32::MAX;

/// One node of the flattened tree.
///
/// A node is a leaf iff both `left` and `right` are INVALID. Internal nodes
/// always carry both children, `count == 0` and `offset == INVALID`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub bounds: Aabb,
    pub left: u32,
    pub right: u32,
    pub offset: u32,
    pub count: u32,
}

impl Node {
    pub fn leaf(bounds: Aabb, offset: u32, count: u32) -> Self {
        Self { bounds, left: INVALID, right: INVALID, offset, count }
    }

    /// Placeholder written before the children exist; patched by `link`.
    pub fn reserved(bounds: Aabb) -> Self {
        Self { bounds, left: INVALID, right: INVALID, offset: INVALID, count: 0 }
    }

    pub fn is_leaf(&self) -> bool {
        self.left == INVALID && self.right == INVALID
    }

    /// Slots of the primitive array referenced by this node, empty for internal nodes.
    pub fn range(&self) -> Range<usize> {
        if self.count == 0 {
            return 0..0;
        }
        self.offset as usize..(self.offset + self.count) as usize
    }
}

/// An exact hit found through the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: Float,
    /// Position in the index's primitive array.
    pub slot: u32,
    /// Position in the sequence the index was built from.
    pub source: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndexStats {
    pub nodes: usize,
    pub leaves: usize,
    pub internal: usize,
    pub empty_leaves: usize,
    pub depth: usize,
    pub largest_leaf: usize,
    pub primitive_refs: usize,
    pub source_primitives: usize,
}

impl IndexStats {
    /// Primitive references stored per input primitive, 1.0 means no duplication.
    pub fn duplication_ratio(&self) -> f64 {
        if self.source_primitives == 0 {
            return 1.0;
        }
        self.primitive_refs as f64 / self.source_primitives as f64
    }
}

// ====================================================================================================
// Storage
// ====================================================================================================

/// The two arrays every builder fills, plus the slot -> input position map.
#[derive(Debug, Clone)]
pub struct FlatIndex<T> {
    pub(crate) nodes: Vec<Node>,
    pub(crate) primitives: Vec<T>,
    pub(crate) sources: Vec<u32>,
    pub(crate) input_len: usize,
}

impl<T: Clone> FlatIndex<T> {
    pub(crate) fn with_capacity(input_len: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(2 * input_len + 1),
            primitives: Vec::with_capacity(input_len),
            sources: Vec::with_capacity(input_len),
            input_len,
        }
    }

    /// Append a node whose children are not known yet and return its id.
    pub(crate) fn reserve(&mut self, bounds: Aabb) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(Node::reserved(bounds));
        id
    }

    pub(crate) fn link(&mut self, id: u32, left: u32, right: u32) {
        let node = &mut self.nodes[id as usize];
        node.left = left;
        node.right = right;
    }

    /// Append `sources` (positions into `input`) as one leaf with the given box.
    pub(crate) fn push_leaf(&mut self, bounds: Aabb, input: &[T], sources: &[u32]) -> Result<u32> {
        let offset = self.primitives.len();
        let end = offset + sources.len();
        if end >= INVALID as usize {
            return Err(IndexError::TooManyPrimitives { count: end });
        }

        for &source in sources {
            self.primitives.push(input[source as usize].clone());
            self.sources.push(source);
        }

        let id = self.nodes.len() as u32;
        self.nodes.push(Node::leaf(bounds, offset as u32, sources.len() as u32));
        Ok(id)
    }
}

/// Shared checks run before any node is built. Returns the bounds of every input.
pub(crate) fn prepare<T: Bounded>(primitives: &[T], config: &IndexConfig) -> Result<Vec<Aabb>> {
    config.validate()?;

    if primitives.len() >= INVALID as usize {
        return Err(IndexError::TooManyPrimitives { count: primitives.len() });
    }

    primitives
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let b = p.bounds();
            // an empty box is allowed, an infinite extent is not
            if b.has_nan() || (!b.is_empty() && !b.is_finite()) {
                Err(IndexError::NonFiniteBounds { index })
            } else {
                Ok(b)
            }
        })
        .collect()
}

// ====================================================================================================
// Queries
// ====================================================================================================

/// Read access to a built index. Candidate queries only need `Bounded`.
pub trait Accelerator<T: Bounded>: Send + Sync {
    fn flat(&self) -> &FlatIndex<T>;

    /// Short name used in logs.
    fn kind(&self) -> &'static str;

    fn nodes<'a>(&'a self) -> &'a [Node]
    where
        T: 'a,
    {
        &self.flat().nodes
    }

    fn primitives(&self) -> &[T] {
        &self.flat().primitives
    }

    /// For every slot of `primitives()`, the input position it was copied from.
    fn sources<'a>(&'a self) -> &'a [u32]
    where
        T: 'a,
    {
        &self.flat().sources
    }

    /// Number of primitives the index was built from.
    fn input_len(&self) -> usize {
        self.flat().input_len
    }

    /// Slots of every leaf whose box the ray intersects, unordered.
    /// A duplicated primitive can show up once per leaf holding it.
    fn query_indices(&self, ray: &Ray) -> Vec<u32> {
        let nodes = self.nodes();
        let mut found = Vec::new();
        if nodes.is_empty() {
            return found;
        }

        let mut stack: Vec<u32> = vec![0];
        while let Some(id) = stack.pop() {
            let node = &nodes[id as usize];
            if !node.bounds.intersects(ray) {
                continue;
            }
            // right first so the left subtree is popped next
            if node.right != INVALID {
                stack.push(node.right);
            }
            if node.left != INVALID {
                stack.push(node.left);
            }
            if node.count > 0 {
                found.extend(node.offset..node.offset + node.count);
            }
        }
        found
    }

    fn query(&self, ray: &Ray) -> Vec<&T> {
        let primitives = self.primitives();
        self.query_indices(ray)
            .into_iter()
            .map(|slot| &primitives[slot as usize])
            .collect()
    }

    /// Input positions of the candidates, sorted and without duplicates.
    fn query_sources(&self, ray: &Ray) -> Vec<u32> {
        let sources = self.sources();
        let mut out: Vec<u32> = self
            .query_indices(ray)
            .into_iter()
            .map(|slot| sources[slot as usize])
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    fn stats(&self) -> IndexStats {
        let nodes = self.nodes();
        let mut stats = IndexStats {
            nodes: nodes.len(),
            primitive_refs: self.primitives().len(),
            source_primitives: self.input_len(),
            ..IndexStats::default()
        };
        if nodes.is_empty() {
            return stats;
        }

        let mut stack = vec![(0u32, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = &nodes[id as usize];
            stats.depth = stats.depth.max(depth);
            if node.is_leaf() {
                stats.leaves += 1;
                stats.largest_leaf = stats.largest_leaf.max(node.count as usize);
                if node.count == 0 {
                    stats.empty_leaves += 1;
                }
            } else {
                stats.internal += 1;
                stack.push((node.left, depth + 1));
                stack.push((node.right, depth + 1));
            }
        }
        stats
    }

    /// Check the node invariants; the message names the first offending node.
    fn validate_structure(&self) -> std::result::Result<(), String> {
        let nodes = self.nodes();
        let n_prims = self.primitives().len();
        if self.sources().len() != n_prims {
            return Err(format!("{} sources for {} primitives", self.sources().len(), n_prims));
        }
        if nodes.is_empty() {
            return Err("index has no root".to_string());
        }

        let mut visited = vec![false; nodes.len()];
        let mut stack = vec![0u32];
        while let Some(id) = stack.pop() {
            let node = nodes.get(id as usize).ok_or(format!("child {id} out of range"))?;
            if std::mem::replace(&mut visited[id as usize], true) {
                return Err(format!("node {id} reached twice"));
            }
            match (node.left == INVALID, node.right == INVALID) {
                (true, true) => {
                    if node.count > 0 && node.range().end > n_prims {
                        return Err(format!("leaf {id} range {:?} exceeds {n_prims} primitives", node.range()));
                    }
                }
                (false, false) => {
                    if node.count != 0 || node.offset != INVALID {
                        return Err(format!("internal node {id} carries primitives"));
                    }
                    if node.left <= id || node.right <= id {
                        return Err(format!("internal node {id} points backwards"));
                    }
                    stack.push(node.left);
                    stack.push(node.right);
                }
                _ => return Err(format!("node {id} has exactly one child")),
            }
        }

        if let Some(orphan) = visited.iter().position(|v| !v) {
            return Err(format!("node {orphan} is unreachable"));
        }
        Ok(())
    }
}

/// Queries that need the exact intersection test of the primitive type.
pub trait ExactQuery<T> {
    fn closest_hit(&self, ray: &Ray, t_interval: &Interval) -> Option<Hit>;
    fn any_hit(&self, ray: &Ray, t_interval: &Interval) -> Option<Hit>;
}

impl<T, A> ExactQuery<T> for A
where
    T: Bounded + Intersect,
    A: Accelerator<T> + ?Sized,
{
    /// Near child first; a node is skipped once its entry distance is past the best hit.
    fn closest_hit(&self, ray: &Ray, t_interval: &Interval) -> Option<Hit> {
        let nodes = self.nodes();
        let primitives = self.primitives();
        let sources = self.sources();
        let mut range = *t_interval;
        let mut best: Option<Hit> = None;

        let entry_of = |id: u32, range: &Interval| -> Option<Float> {
            nodes[id as usize]
                .bounds
                .slab(ray)
                .filter(|t| t.max >= range.min && t.min <= range.max)
                .map(|t| t.min)
        };

        let mut stack: Vec<(u32, Float)> = Vec::new();
        if let Some(entry) = nodes.first().and_then(|_| entry_of(0, &range)) {
            stack.push((0, entry));
        }

        while let Some((id, entry)) = stack.pop() {
            if entry > range.max {
                continue;
            }
            let node = &nodes[id as usize];
            if node.is_leaf() {
                for slot in node.range() {
                    if let Some(t) = primitives[slot].intersect(ray, &range) {
                        range.max = t;
                        best = Some(Hit { t, slot: slot as u32, source: sources[slot] });
                    }
                }
                continue;
            }

            let left = entry_of(node.left, &range).map(|t| (node.left, t));
            let right = entry_of(node.right, &range).map(|t| (node.right, t));
            match (left, right) {
                (Some(l), Some(r)) => {
                    let (near, far) = if l.1 <= r.1 { (l, r) } else { (r, l) };
                    stack.push(far);
                    stack.push(near);
                }
                (Some(only), None) | (None, Some(only)) => stack.push(only),
                (None, None) => {}
            }
        }
        best
    }

    fn any_hit(&self, ray: &Ray, t_interval: &Interval) -> Option<Hit> {
        let nodes = self.nodes();
        let primitives = self.primitives();
        let mut stack: Vec<u32> = if nodes.is_empty() { vec![] } else { vec![0] };

        while let Some(id) = stack.pop() {
            let node = &nodes[id as usize];
            if !node.bounds.intersects(ray) {
                continue;
            }
            if node.is_leaf() {
                for slot in node.range() {
                    if let Some(t) = primitives[slot].intersect(ray, t_interval) {
                        return Some(Hit { t, slot: slot as u32, source: self.sources()[slot] });
                    }
                }
            } else {
                stack.push(node.right);
                stack.push(node.left);
            }
        }
        None
    }
}
