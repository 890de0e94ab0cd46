pub mod aabb;
pub mod acceleration;
pub mod bvh;
pub mod camera;
pub mod caster;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod interval;
pub mod json_parser;
pub mod kdtree;
pub mod numeric;
pub mod ray;
pub mod sampler;
pub mod scene;
pub mod shapes;

pub mod prelude;
