/*

    Closed ranges [a, b] of floats.

    Used twice in the index: as the per-axis extent of a
    box while it is being grown from vertices, and as the
    running [tmin, tmax] of the slab test.

    See also associated constants of Interval class:
    - EMPTY: (inf, -inf), identity of expand/union
    - UNIVERSE: (-inf, inf)
    - NONNEGATIVE: (0, inf), the parametric range of a ray

    @author: Bartu
    @date: Sept 2025

*/

use crate::numeric::Float;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: Float,
    pub max: Float,
}

impl Interval {

    pub const EMPTY: Self = Self {
        min: Float::INFINITY,
        max: Float::NEG_INFINITY,
    };

    pub const UNIVERSE: Self = Self {
        min: Float::NEG_INFINITY,
        max: Float::INFINITY,
    };

    pub const NONNEGATIVE: Self = Self {
        min: 0.0,
        max: Float::INFINITY,
    };

    pub fn new(min: Float, max: Float) -> Self {
        Self {
            min,
            max,
        }
    }

    pub fn positive(epsilon: Float) -> Self {
        // [epsilon, inf)
        Self {
            min: epsilon,
            max: Float::INFINITY,
        }
    }

    pub fn validate(&self) -> bool {
        self.max >= self.min
    }

    pub fn is_empty(&self) -> bool {
        !self.validate()
    }

    pub fn size(&self) -> Float {
        self.max - self.min
    }

    pub fn contains(&self, x: Float) -> bool {
        self.min <= x && x <= self.max
    }

    pub fn surrounds(&self, x: Float) -> bool {
        self.min < x && x < self.max
    }

    pub fn expand(&mut self, x: Float) {
        if x < self.min { self.min = x; }
        if x > self.max { self.max = x; }
    }

    /// Shrink to the part shared with `[near, far]`.
    pub fn clip(&mut self, near: Float, far: Float) {
        self.min = self.min.max(near);
        self.max = self.max.min(far);
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_identity_of_expand() {
        let mut i = Interval::EMPTY;
        assert!(i.is_empty());
        i.expand(2.0);
        assert_eq!(i, Interval::new(2.0, 2.0));
        i.expand(-1.0);
        assert_eq!(i, Interval::new(-1.0, 2.0));
        assert_eq!(i.size(), 3.0);
    }

    #[test]
    fn clip_narrows_both_ends() {
        let mut i = Interval::NONNEGATIVE;
        i.clip(-5.0, 10.0);
        assert_eq!(i, Interval::new(0.0, 10.0));
        i.clip(3.0, 20.0);
        assert_eq!(i, Interval::new(3.0, 10.0));
        i.clip(11.0, 12.0);
        assert!(i.is_empty());
    }

    #[test]
    fn contains_is_closed_surrounds_is_open() {
        let i = Interval::new(0.0, 1.0);
        assert!(i.contains(0.0) && i.contains(1.0));
        assert!(!i.surrounds(0.0) && i.surrounds(0.5));
        assert!(Interval::positive(0.1).contains(1e9));
        assert!(Interval::UNIVERSE.contains(-1e30));
    }
}
