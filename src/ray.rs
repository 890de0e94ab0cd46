/*

    Rays fired into the index: r(t) = o + d * t

    Direction does not have to be normalized for the
    candidate queries; the exact tests in geometry.rs
    report t in units of the given direction.

    @date: Oct, 2025
    @author: Bartu
*/

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {

    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            origin,
            direction,
        }
    }

    /// Build a ray whose direction is normalized.
    pub fn towards(origin: Vector3, target: Vector3) -> Self {
        Self::new(origin, (target - origin).normalize())
    }

    #[inline]
    pub fn at(&self, t: Float) -> Vector3 {
        self.origin + self.direction * t // r(t) = o + dt
    }

    #[inline]
    pub fn squared_distance_at(&self, t: Float) -> Float {
        (self.at(t) - self.origin).length_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_moves_along_direction() {
        let ray = Ray::new(Vector3::ZERO, Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(ray.at(1.5), Vector3::new(0.0, 0.0, 3.0));
        assert!(approx_zero(ray.squared_distance_at(1.0) - 4.0));
    }

    #[test]
    fn towards_is_normalized() {
        let ray = Ray::towards(Vector3::ONE, Vector3::new(1.0, 5.0, 1.0));
        assert!(ray.direction.is_normalized());
        assert_eq!(ray.direction, Vector3::Y);
    }
}
