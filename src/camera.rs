/*

    Pinhole camera that produces the primary rays
    fed to the index in batches.

    @date: Oct, 2025
    @author: bartu
*/

use crate::json_parser::{deser_float, deser_float4, deser_pair, deser_vec3};
use crate::ray::Ray;
use crate::prelude::*;

#[derive(Debug, Deserialize, Clone)]
#[derive(SmartDefault)]
#[serde(default)]
pub struct Camera {
    #[serde(rename = "Position", deserialize_with = "deser_vec3")]
    #[default(Vector3::new(0.0, 0.0, -10.0))]
    pub position: Vector3,

    #[serde(rename = "Gaze", deserialize_with = "deser_vec3")]
    #[default(Vector3::Z)]
    pub gaze: Vector3,

    #[serde(rename = "Up", deserialize_with = "deser_vec3")]
    #[default(Vector3::Y)]
    pub up: Vector3,

    /// left, right, bottom, top on the image plane
    #[serde(rename = "NearPlane", deserialize_with = "deser_float4")]
    #[default([-1.6, 1.6, -0.9, 0.9])]
    pub near_plane: [Float; 4],

    #[serde(rename = "NearDistance", deserialize_with = "deser_float")]
    #[default(1.0)]
    pub near_distance: Float,

    #[serde(rename = "ImageResolution", deserialize_with = "deser_pair")]
    #[default([160, 90])]
    pub image_resolution: [usize; 2],
}

impl Camera {
    /// Right, up and backward vectors. Up is corrected when it is
    /// not perpendicular to the gaze.
    pub fn basis(&self) -> (Vector3, Vector3, Vector3) {
        let w = -self.gaze.normalize();
        let u = self.up.cross(w).normalize();
        let v = w.cross(u);
        (u, v, w)
    }

    /// Order: [top-left, top-right, bottom-left, bottom-right]
    pub fn near_plane_corners(&self) -> [Vector3; 4] {
        let (u, v, w) = self.basis();
        let [left, right, bottom, top] = self.near_plane;
        let plane_center = self.position - w * self.near_distance;
        [
            plane_center + u * left + v * top,
            plane_center + u * right + v * top,
            plane_center + u * left + v * bottom,
            plane_center + u * right + v * bottom,
        ]
    }

    /// One normalized ray per pixel, row-major from the top-left pixel.
    pub fn generate_primary_rays(&self) -> Vec<Ray> {
        let [width, height] = self.image_resolution;
        get_pixel_centers(width, height, &self.near_plane_corners())
            .into_iter()
            .map(|center| Ray::towards(self.position, center))
            .collect()
    }
}

pub fn get_pixel_centers(width: usize, height: usize, corners: &[Vector3; 4]) -> Vec<Vector3> {
    let mut pixel_centers = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let u = (col as Float + 0.5) / width as Float;
            let v = (row as Float + 0.5) / height as Float;

            let top = corners[0] * (1.0 - u) + corners[1] * u;
            let bottom = corners[2] * (1.0 - u) + corners[3] * u;
            pixel_centers.push(top * (1.0 - v) + bottom * v);
        }
    }
    pixel_centers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_is_orthonormal_for_skewed_up() {
        let cam = Camera {
            gaze: Vector3::new(0.0, 0.2, -10.0),
            ..Camera::default()
        };
        let (u, v, w) = cam.basis();
        assert!(approx_zero(u.dot(v)));
        assert!(approx_zero(v.dot(w)));
        assert!(approx_zero(w.dot(u)));
        assert!(approx_zero(v.length() - 1.0));
    }

    #[test]
    fn one_ray_per_pixel() {
        let cam = Camera {
            image_resolution: [4, 3],
            ..Camera::default()
        };
        let rays = cam.generate_primary_rays();
        assert_eq!(rays.len(), 12);
        assert!(rays.iter().all(|r| r.origin == cam.position));
        assert!(rays.iter().all(|r| approx_zero(r.direction.length() - 1.0)));
    }

    #[test]
    fn first_ray_points_top_left() {
        let cam = Camera::default();
        let first = cam.generate_primary_rays()[0];
        // default camera looks down +Z with +Y up, so its right vector is -X
        assert!(first.direction.y > 0.0);
        assert!(first.direction.x > 0.0);
        assert!(first.direction.z > 0.0);
    }

    #[test]
    fn single_pixel_looks_along_gaze() {
        let cam = Camera {
            image_resolution: [1, 1],
            ..Camera::default()
        };
        let centers = get_pixel_centers(1, 1, &cam.near_plane_corners());
        assert!(approx_zero((centers[0] - Vector3::new(0.0, 0.0, -9.0)).length()));
    }
}
