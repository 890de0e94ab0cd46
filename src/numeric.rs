/*

    Declare numeric types used throughout this repo.

    Everything that ends up in the flattened index is
    uploaded to device memory as 32-bit floats, so the
    whole crate computes in f32. If you change Float,
    update Vector3 and Vector4 as well.

    @date: 2 Oct, 2025
    @author: Bartu
*/

use bevy_math::{Vec3, Vec4};

pub type Float = f32; // WARNING: Vector3/Vector4 below must match this width
pub type Vector3 = Vec3;
pub type Vector4 = Vec4;

/// Number of geometrically meaningful axes.
pub const AXES: usize = 3;

pub fn approx_zero(x: Float) -> bool {
    x.abs() < 1e-6
}

/// Drop the homogeneous component of a 4-vector.
#[inline]
pub fn truncate(v: Vector4) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

/// Extend a point with w = 0, the padding used in device buffers.
#[inline]
pub fn extend(v: Vector3) -> [Float; 4] {
    [v.x, v.y, v.z, 0.0]
}
