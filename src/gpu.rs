/*

    Device-side layout of a built index.

    The layout is fixed because shaders read these buffers as raw bytes:

    GpuNode (48 bytes)
      0  min    vec4<f32>   w = 0
     16  max    vec4<f32>   w = 0
     32  left   u32         0xFFFFFFFF for leaves
     36  right  u32         0xFFFFFFFF for leaves
     40  offset u32         first slot in the primitive buffer, 0xFFFFFFFF for internal nodes
     44  count  u32         0 for internal nodes

    GpuPrimitive (64 bytes)
      0  kind   u32         0 = sphere, 1 = triangle
      4  material u32
      8  _pad   [u32; 2]
     16  data   [vec4<f32>; 3]  sphere: (center, radius), 0, 0; triangle: v0, v1, v2

    Empty boxes keep their +inf/-inf corners.

    @date: 13 Nov, 2025
    @author: bartu
*/

use bytemuck::{Pod, Zeroable};

use crate::acceleration::{Accelerator, Node};
use crate::shapes::Primitive;
use crate::prelude::*;

pub const KIND_SPHERE: u32 = 0;
pub const KIND_TRIANGLE: u32 = 1;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuNode {
    pub min: [f32; 4],
    pub max: [f32; 4],
    pub left: u32,
    pub right: u32,
    pub offset: u32,
    pub count: u32,
}

impl From<&Node> for GpuNode {
    fn from(node: &Node) -> Self {
        Self {
            min: extend(node.bounds.min),
            max: extend(node.bounds.max),
            left: node.left,
            right: node.right,
            offset: node.offset,
            count: node.count,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuPrimitive {
    pub kind: u32,
    pub material: u32,
    pub _pad: [u32; 2],
    pub data: [[f32; 4]; 3],
}

impl From<&Primitive> for GpuPrimitive {
    fn from(p: &Primitive) -> Self {
        match p {
            Primitive::Sphere(s) => Self {
                kind: KIND_SPHERE,
                material: s.material,
                _pad: [0; 2],
                data: [[s.center.x, s.center.y, s.center.z, s.radius], [0.0; 4], [0.0; 4]],
            },
            Primitive::Triangle(t) => Self {
                kind: KIND_TRIANGLE,
                material: 0,
                _pad: [0; 2],
                data: [extend(t.v0), extend(t.v1), extend(t.v2)],
            },
        }
    }
}

/// Both arrays of an index, converted and ready for upload.
#[derive(Debug, Clone, Default)]
pub struct GpuBuffers {
    pub nodes: Vec<GpuNode>,
    pub primitives: Vec<GpuPrimitive>,
}

impl GpuBuffers {
    pub fn from_index<A: Accelerator<Primitive> + ?Sized>(index: &A) -> Self {
        let buffers = Self {
            nodes: index.nodes().iter().map(GpuNode::from).collect(),
            primitives: index.primitives().iter().map(GpuPrimitive::from).collect(),
        };
        debug!(
            "Packed {} for upload: {} node bytes, {} primitive bytes",
            index.kind(),
            buffers.node_bytes().len(),
            buffers.primitive_bytes().len()
        );
        buffers
    }

    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    pub fn primitive_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.primitives)
    }
}
