/*

    Axis Aligned Bounding Box

    Boxes are stored as two 3D corners. Inputs coming from
    homogeneous vec4 data are accepted, but w is dropped: only
    x, y, z take part in any predicate.

    The EMPTY box is (min = +inf, max = -inf) so that union
    with it is the identity.

    @author: bartu
    @date: 9 Nov, 2025
*/

use crate::interval::Interval;
use crate::ray::Ray;
use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3,
    pub max: Vector3,
}

/// Anything that can report its own axis aligned bounds.
///
/// This is the only thing the index ever asks of a primitive.
pub trait Bounded {
    fn bounds(&self) -> Aabb;
}

impl Bounded for Aabb {
    fn bounds(&self) -> Aabb {
        *self
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {

    pub const EMPTY: Self = Self {
        min: Vector3::INFINITY,
        max: Vector3::NEG_INFINITY,
    };

    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    pub fn from_homogeneous(min: Vector4, max: Vector4) -> Self {
        Self::new(truncate(min), truncate(max))
    }

    pub fn from_intervals(xint: &Interval, yint: &Interval, zint: &Interval) -> Self {
        Self {
            min: Vector3::new(xint.min, yint.min, zint.min),
            max: Vector3::new(xint.max, yint.max, zint.max),
        }
    }

    pub fn from_points(points: &[Vector3]) -> Self {
        points.iter().fold(Self::EMPTY, |acc, p| Self {
            min: acc.min.min(*p),
            max: acc.max.max(*p),
        })
    }

    /// Componentwise min of mins, max of maxes.
    pub fn union(a: &Aabb, b: &Aabb) -> Aabb {
        Aabb {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Bound of a whole collection, EMPTY for none.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a Aabb>) -> Aabb {
        boxes.into_iter().fold(Self::EMPTY, |acc, b| Self::union(&acc, b))
    }

    pub fn is_empty(&self) -> bool {
        (0..AXES).any(|i| self.min[i] > self.max[i])
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    pub fn has_nan(&self) -> bool {
        self.min.is_nan() || self.max.is_nan()
    }

    pub fn axis(&self, axis: usize) -> Interval {
        Interval::new(self.min[axis], self.max[axis])
    }

    /// Slab overlap on all three axes. Touching faces count as overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        (0..AXES).all(|i| self.min[i] <= other.max[i] && self.max[i] >= other.min[i])
    }

    pub fn contains(&self, other: &Aabb) -> bool {
        (0..AXES).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i])
    }

    pub fn contains_point(&self, p: Vector3) -> bool {
        (0..AXES).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }

    /// Copy of this box with the upper bound on `axis` moved to `value`.
    pub fn with_max(&self, axis: usize, value: Float) -> Aabb {
        let mut out = *self;
        out.max[axis] = value;
        out
    }

    /// Copy of this box with the lower bound on `axis` moved to `value`.
    pub fn with_min(&self, axis: usize, value: Float) -> Aabb {
        let mut out = *self;
        out.min[axis] = value;
        out
    }

    pub fn centroid(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    pub fn diagonal(&self) -> Vector3 {
        if self.is_empty() {
            return Vector3::ZERO;
        }
        self.max - self.min
    }

    pub fn longest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Slab test returning the parametric [entry, exit] range along the ray,
    /// clipped to t >= 0, or None on a miss.
    ///
    /// A zero direction component divides to +-inf. When the origin also sits
    /// on that slab's plane the quotient is 0/0; such an axis puts no bound on t.
    pub fn slab(&self, ray: &Ray) -> Option<Interval> {
        if self.is_empty() {
            return None;
        }

        let mut t = Interval::NONNEGATIVE;
        for axis in 0..AXES {
            let o = ray.origin[axis];
            let d = ray.direction[axis];
            let t1 = (self.min[axis] - o) / d;
            let t2 = (self.max[axis] - o) / d;

            let near = nan_to(t1, Float::NEG_INFINITY).min(nan_to(t2, Float::NEG_INFINITY));
            let far = nan_to(t1, Float::INFINITY).max(nan_to(t2, Float::INFINITY));
            t.clip(near, far);
        }

        // Entry at infinity only happens for a parallel ray outside the slab
        (t.validate() && t.min.is_finite()).then_some(t)
    }

    pub fn intersects(&self, ray: &Ray) -> bool {
        self.slab(ray).is_some()
    }
}

#[inline]
fn nan_to(x: Float, fallback: Float) -> Float {
    if x.is_nan() { fallback } else { x }
}
