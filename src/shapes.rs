/*

    Declare primitives stored in the index: Triangle, Sphere

    The index itself only sees them through Bounded; the
    closed Primitive enum is what a scene holds so that
    spheres and triangles can share one primitive array.

    @date: Oct, 2025
    @author: bartu
*/

use crate::aabb::{Aabb, Bounded};
use crate::interval::Interval;
use crate::prelude::*;


// =======================================================================================================
// Triangle (impl Bounded)
// =======================================================================================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Vector3,
    pub v1: Vector3,
    pub v2: Vector3,
}

impl Triangle {
    pub fn new(v0: Vector3, v1: Vector3, v2: Vector3) -> Self {
        Self { v0, v1, v2 }
    }

    pub fn vertices(&self) -> [Vector3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn centroid(&self) -> Vector3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Group a flat vertex list into triangles, every 3 vertices form one.
    /// The w component of each vertex is ignored.
    pub fn from_soup(vertices: &[Vector4]) -> Result<Vec<Triangle>> {
        if vertices.len() % 3 != 0 {
            return Err(IndexError::MalformedSoup { len: vertices.len() });
        }

        Ok(vertices
            .chunks_exact(3)
            .map(|c| Triangle::new(truncate(c[0]), truncate(c[1]), truncate(c[2])))
            .collect())
    }
}

impl Bounded for Triangle {
    fn bounds(&self) -> Aabb {
        let (mut xint, mut yint, mut zint) = (Interval::EMPTY, Interval::EMPTY, Interval::EMPTY);
        for v in self.vertices() {
            xint.expand(v.x);
            yint.expand(v.y);
            zint.expand(v.z);
        }

        Aabb::from_intervals(&xint, &yint, &zint)
    }
}

// =======================================================================================================
// Sphere (impl Bounded)
// =======================================================================================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vector3,
    pub radius: Float,
    pub material: u32,
}

impl Sphere {
    pub fn new(center: Vector3, radius: Float, material: u32) -> Self {
        Self { center, radius, material }
    }
}

impl Bounded for Sphere {
    fn bounds(&self) -> Aabb {
        let r = self.radius.abs();
        let xint = Interval::new(self.center.x - r, self.center.x + r);
        let yint = Interval::new(self.center.y - r, self.center.y + r);
        let zint = Interval::new(self.center.z - r, self.center.z + r);

        Aabb::from_intervals(&xint, &yint, &zint)
    }
}

// =======================================================================================================
// Primitive
// =======================================================================================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Bounded for Primitive {
    fn bounds(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounds(),
            Primitive::Triangle(t) => t.bounds(),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Triangle> for Primitive {
    fn from(t: Triangle) -> Self {
        Primitive::Triangle(t)
    }
}
