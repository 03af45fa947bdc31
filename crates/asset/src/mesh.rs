//! CPU-side model representation shared by the loaders and the tangent pass.

use corelib::{ModelError, ModelResult, Vec2, Vec3};

/// One corner of one triangle. Values are in object space.
///
/// `tangent` and `binormal` are zero until [`crate::tangent::compute_tangent_space`]
/// has run on the owning [`ModelRecord`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VertexAttributes {
    pub position: Vec3,
    pub texcoord: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub binormal: Vec3,
}

impl VertexAttributes {
    pub fn new(position: Vec3, texcoord: Vec2, normal: Vec3) -> Self {
        Self {
            position,
            texcoord,
            normal,
            tangent: Vec3::ZERO,
            binormal: Vec3::ZERO,
        }
    }
}

/// Flat (non-shared) triangle list: every three consecutive vertices form a face
/// and the index buffer is always `0..vertex_count`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelRecord {
    vertices: Vec<VertexAttributes>,
    has_tangents: bool,
}

impl ModelRecord {
    pub fn new(vertices: Vec<VertexAttributes>) -> Self {
        Self {
            vertices,
            has_tangents: false,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Same as the vertex count; the geometry is never deduplicated.
    pub fn index_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn has_tangents(&self) -> bool {
        self.has_tangents
    }

    /// Vertices with only position/texcoord/normal guaranteed.
    pub fn vertices(&self) -> &[VertexAttributes] {
        &self.vertices
    }

    /// Vertices with a computed tangent frame, or `MissingTangents`.
    pub fn finished_vertices(&self) -> ModelResult<&[VertexAttributes]> {
        if self.has_tangents {
            Ok(&self.vertices)
        } else {
            Err(ModelError::MissingTangents)
        }
    }

    /// Triangle-list indices, `index[i] == i`. Fails once the vertex count
    /// no longer fits a 32-bit index buffer.
    pub fn indices(&self) -> ModelResult<Vec<u32>> {
        sequential_indices(self.vertices.len())
    }

    /// Complete faces in order; a trailing partial triangle is skipped.
    pub fn faces(&self) -> impl Iterator<Item = &[VertexAttributes]> {
        self.vertices.chunks_exact(3)
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut [VertexAttributes] {
        &mut self.vertices
    }

    pub(crate) fn mark_tangents_computed(&mut self) {
        self.has_tangents = true;
    }
}

fn sequential_indices(len: usize) -> ModelResult<Vec<u32>> {
    let count = u32::try_from(len).map_err(|_| {
        ModelError::format(0, format!("{} vertices exceed the u32 index range", len))
    })?;
    Ok((0..count).collect())
}
