//! Seams between the model pipeline and a graphics API.

use std::path::Path;

use asset::VertexAttributes;
use bytemuck::{Pod, Zeroable};
use corelib::ResourceError;
use wgpu::{VertexBufferLayout, VertexStepMode};

/// Packed vertex as uploaded: position, texcoord, normal, tangent, binormal.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub binormal: [f32; 3],
}

impl GpuVertex {
    pub const STRIDE: u32 = std::mem::size_of::<GpuVertex>() as u32;

    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: Self::STRIDE as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x2,
            2 => Float32x3,
            3 => Float32x3,
            4 => Float32x3,
        ],
    };

    /// Pipelines drawing these buffers use a plain triangle list.
    pub const TOPOLOGY: wgpu::PrimitiveTopology = wgpu::PrimitiveTopology::TriangleList;
}

impl From<&VertexAttributes> for GpuVertex {
    fn from(v: &VertexAttributes) -> Self {
        Self {
            position: v.position.to_array(),
            texcoord: v.texcoord.to_array(),
            normal: v.normal.to_array(),
            tangent: v.tangent.to_array(),
            binormal: v.binormal.to_array(),
        }
    }
}

/// Creates geometry buffers and records per-frame draws.
///
/// Handles are released by dropping them.
pub trait RenderBackend {
    type VertexBuffer;
    type IndexBuffer;
    /// Whatever draw commands are recorded into (a render pass, a command list).
    type Pass<'p>;

    fn create_vertex_buffer(
        &self,
        label: &str,
        vertices: &[GpuVertex],
    ) -> Result<Self::VertexBuffer, ResourceError>;

    fn create_index_buffer(
        &self,
        label: &str,
        indices: &[u32],
    ) -> Result<Self::IndexBuffer, ResourceError>;

    /// Bind both buffers as a `u32` triangle list and draw `index_count` indices.
    fn bind_and_draw(
        &self,
        pass: &mut Self::Pass<'_>,
        vertices: &Self::VertexBuffer,
        indices: &Self::IndexBuffer,
        stride: u32,
        index_count: u32,
    );
}

/// Which texture slot a texture is loaded for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureSlot {
    /// Slot 0, sampled as sRGB colour.
    Color,
    /// Slot 1, tangent-space normals stored linearly.
    Normal,
}

impl TextureSlot {
    pub fn index(self) -> usize {
        match self {
            TextureSlot::Color => 0,
            TextureSlot::Normal => 1,
        }
    }
}

/// Turns texture files into opaque GPU handles, released on drop.
pub trait TextureProvider {
    type Texture;

    fn load_texture(&self, path: &Path, slot: TextureSlot) -> Result<Self::Texture, ResourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{Vec3, vec2, vec3};

    #[test]
    fn stride_matches_fourteen_floats() {
        assert_eq!(GpuVertex::STRIDE, 14 * 4);
        assert_eq!(GpuVertex::LAYOUT.attributes.len(), 5);
        assert_eq!(GpuVertex::LAYOUT.attributes[4].offset, 11 * 4);
    }

    #[test]
    fn packs_all_attributes() {
        let mut v = VertexAttributes::new(vec3(1.0, 2.0, 3.0), vec2(0.25, 0.75), Vec3::Z);
        v.tangent = Vec3::X;
        v.binormal = Vec3::Y;
        let packed = GpuVertex::from(&v);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&packed));
        assert_eq!(
            floats,
            &[1.0, 2.0, 3.0, 0.25, 0.75, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }
}
