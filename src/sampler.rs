/*

    Random scene and ray generators, used by the
    demo binary and by the tests to stress the index.

    Pass a seeded rng (e.g. StdRng::seed_from_u64) to
    get the same scene on every run.

    @date: Oct, 2025
    @author: bartu
*/

use rand::Rng;

use crate::aabb::Aabb;
use crate::ray::Ray;
use crate::shapes::{Sphere, Triangle};
use crate::prelude::*;

pub fn random_float() -> Float {
    rand::random::<Float>()
}

/// Uniform point inside `bounds`.
pub fn random_point<R: Rng + ?Sized>(rng: &mut R, bounds: &Aabb) -> Vector3 {
    let t = Vector3::new(rng.random::<Float>(), rng.random::<Float>(), rng.random::<Float>());
    bounds.min + bounds.diagonal() * t
}

/// Uniform direction on the unit sphere.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector3 {
    let z: Float = rng.random_range(-1.0..=1.0);
    let phi: Float = rng.random_range(0.0..std::f32::consts::TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vector3::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn random_spheres<R: Rng + ?Sized>(rng: &mut R, count: usize, bounds: &Aabb, max_radius: Float) -> Vec<Sphere> {
    (0..count)
        .map(|i| {
            let radius = rng.random_range(0.05 * max_radius..=max_radius);
            Sphere::new(random_point(rng, bounds), radius, (i % 8) as u32)
        })
        .collect()
}

/// Small triangles scattered inside `bounds`, each vertex within `size` of the first.
pub fn random_triangles<R: Rng + ?Sized>(rng: &mut R, count: usize, bounds: &Aabb, size: Float) -> Vec<Triangle> {
    (0..count)
        .map(|_| {
            let v0 = random_point(rng, bounds);
            let v1 = v0 + random_direction(rng) * size;
            let v2 = v0 + random_direction(rng) * size;
            Triangle::new(v0, v1, v2)
        })
        .collect()
}

/// Rays from random points on a box around `bounds`, aimed at random points inside it.
pub fn random_rays<R: Rng + ?Sized>(rng: &mut R, count: usize, bounds: &Aabb) -> Vec<Ray> {
    let pad = bounds.diagonal() * 0.5;
    let outer = Aabb::new(bounds.min - pad, bounds.max + pad);
    (0..count)
        .map(|_| {
            let origin = random_point(rng, &outer);
            let mut target = random_point(rng, bounds);
            if (target - origin).length_squared() == 0.0 {
                target += Vector3::X;
            }
            Ray::towards(origin, target)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aabb::Bounded;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn unit_cube() -> Aabb {
        Aabb::new(Vector3::ZERO, Vector3::ONE)
    }

    #[test]
    fn points_stay_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(unit_cube().contains_point(random_point(&mut rng, &unit_cube())));
        }
    }

    #[test]
    fn directions_are_unit() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!((random_direction(&mut rng).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn same_seed_same_scene() {
        let a = random_spheres(&mut StdRng::seed_from_u64(3), 50, &unit_cube(), 0.1);
        let b = random_spheres(&mut StdRng::seed_from_u64(3), 50, &unit_cube(), 0.1);
        assert_eq!(a, b);
    }

    #[test]
    fn triangles_are_near_their_anchor() {
        let mut rng = StdRng::seed_from_u64(11);
        let tris = random_triangles(&mut rng, 100, &unit_cube(), 0.2);
        let grown = Aabb::new(Vector3::splat(-0.21), Vector3::splat(1.21));
        assert!(tris.iter().all(|t| grown.contains(&t.bounds())));
    }

    #[test]
    fn rays_are_normalized() {
        let mut rng = StdRng::seed_from_u64(5);
        let rays = random_rays(&mut rng, 100, &unit_cube());
        assert!(rays.iter().all(|r| (r.direction.length() - 1.0).abs() < 1e-4));
        assert!((0.0..=1.0).contains(&random_float()));
    }
}
