/*

    Exact ray/primitive tests.

    The index only narrows the candidate set; deciding
    whether a candidate is really hit, and where, happens
    here. Every test returns the ray parameter t of the
    nearest hit inside the given interval.

    @date: 9 Oct, 2025
    @author: bartu
*/

use crate::interval::Interval;
use crate::ray::Ray;
use crate::shapes::{Primitive, Sphere, Triangle};
use crate::prelude::*;

const PARALLEL_EPSILON: Float = 1e-8;

pub trait Intersect {
    fn intersect(&self, ray: &Ray, t_interval: &Interval) -> Option<Float>;
}

impl Intersect for Sphere {
    fn intersect(&self, ray: &Ray, t_interval: &Interval) -> Option<Float> {
        let o_minus_c = ray.origin - self.center;
        let d_dot_d = ray.direction.dot(ray.direction);
        let d_dot_oc = ray.direction.dot(o_minus_c);
        let oc_dot_oc = o_minus_c.dot(o_minus_c);
        let discriminant = d_dot_oc * d_dot_oc - d_dot_d * (oc_dot_oc - self.radius * self.radius);
        if discriminant < 0.0 || d_dot_d == 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = (-d_dot_oc - root) / d_dot_d;
        let far = (-d_dot_oc + root) / d_dot_d;
        // Pick smaller first
        [near, far].into_iter().find(|t| t_interval.contains(*t))
    }
}

impl Intersect for Triangle {
    fn intersect(&self, ray: &Ray, t_interval: &Interval) -> Option<Float> {
        moller_trumbore_intersection(ray, t_interval, self.vertices()).map(|(_, _, t)| t)
    }
}

impl Intersect for Primitive {
    fn intersect(&self, ray: &Ray, t_interval: &Interval) -> Option<Float> {
        match self {
            Primitive::Sphere(s) => s.intersect(ray, t_interval),
            Primitive::Triangle(t) => t.intersect(ray, t_interval),
        }
    }
}

/// Returns (u, v, t) for a hit, u and v being barycentric weights of v1 and v2.
pub fn moller_trumbore_intersection(ray: &Ray, t_interval: &Interval, tri: [Vector3; 3]) -> Option<(Float, Float, Float)> {
    //     a (pivot)
    //    / \
    //  b  -  c
    let [tri_pivot, tri_left, tri_right] = tri;
    let edge_ab = tri_left - tri_pivot;
    let edge_ac = tri_right - tri_pivot;
    let perp = ray.direction.cross(edge_ac);
    let determinant: Float = perp.dot(edge_ab);
    if determinant.abs() < PARALLEL_EPSILON {
        return None; // parallel to the triangle plane, or degenerate triangle
    }
    let inverse_determinant = 1.0 / determinant;
    let dist = ray.origin - tri_pivot;
    let barycentric_u = dist.dot(perp) * inverse_determinant;
    if !(0.0..=1.0).contains(&barycentric_u) {
        return None;
    }
    let another_perp = dist.cross(edge_ab);
    let barycentric_v = ray.direction.dot(another_perp) * inverse_determinant;
    if (barycentric_v < 0.0) || ((barycentric_u + barycentric_v) > 1.0) {
        return None;
    }
    let t = edge_ac.dot(another_perp) * inverse_determinant;
    if !t_interval.contains(t) {
        return None;
    }
    Some((barycentric_u, barycentric_v, t))
}
