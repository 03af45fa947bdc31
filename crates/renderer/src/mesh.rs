//! GPU-resident model: geometry buffers, draw counts and its texture set.

use std::path::{Path, PathBuf};

use asset::{ModelFormat, ModelRecord, compute_tangent_space, load_model};
use corelib::{LoadError, ModelError};

use crate::{
    backend::{GpuVertex, RenderBackend, TextureProvider},
    textures::TextureSet,
};

/// Everything needed to bring one model up.
#[derive(Clone, Debug)]
pub struct MeshDesc {
    pub model: PathBuf,
    pub format: ModelFormat,
    pub color_map: PathBuf,
    pub normal_map: PathBuf,
    /// Keep the finished CPU record after upload.
    pub retain_cpu_copy: bool,
}

impl MeshDesc {
    pub fn new(
        model: impl Into<PathBuf>,
        color_map: impl Into<PathBuf>,
        normal_map: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model: model.into(),
            format: ModelFormat::Auto,
            color_map: color_map.into(),
            normal_map: normal_map.into(),
            retain_cpu_copy: false,
        }
    }
}

/// A loaded model. Fields drop in declaration order: buffers, textures, CPU copy.
pub struct Mesh<B: RenderBackend, T> {
    vertex_buffer: B::VertexBuffer,
    index_buffer: B::IndexBuffer,
    textures: TextureSet<T>,
    cpu_copy: Option<ModelRecord>,
    vertex_count: u32,
    index_count: u32,
}

impl<B: RenderBackend, T> Mesh<B, T> {
    /// Load the model file, compute its tangent space, upload the geometry and
    /// load both textures. Any failure releases what was already acquired.
    pub fn initialize<P>(backend: &B, provider: &P, desc: &MeshDesc) -> Result<Self, LoadError>
    where
        P: TextureProvider<Texture = T>,
    {
        let mut record = load_model(&desc.model, desc.format)?;
        compute_tangent_space(&mut record)?;
        Self::upload(
            backend,
            provider,
            record,
            &desc.color_map,
            &desc.normal_map,
            desc.retain_cpu_copy,
        )
    }

    /// Upload a record whose tangent space is already computed.
    pub fn upload<P>(
        backend: &B,
        provider: &P,
        record: ModelRecord,
        color_map: &Path,
        normal_map: &Path,
        retain_cpu_copy: bool,
    ) -> Result<Self, LoadError>
    where
        P: TextureProvider<Texture = T>,
    {
        let vertices: Vec<GpuVertex> = record
            .finished_vertices()?
            .iter()
            .map(GpuVertex::from)
            .collect();
        let indices = record.indices()?;
        let Some(&last) = indices.last() else {
            return Err(ModelError::format(0, "model contains no triangles").into());
        };
        let vertex_count = last + 1;

        let vertex_buffer = backend.create_vertex_buffer("Model VB", &vertices)?;
        let index_buffer = backend.create_index_buffer("Model IB", &indices)?;
        let textures = TextureSet::load(provider, color_map, normal_map)?;

        log::info!(
            "Uploaded model: {} vertices, {} faces, stride {}",
            vertex_count,
            record.face_count(),
            GpuVertex::STRIDE
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            textures,
            cpu_copy: retain_cpu_copy.then_some(record),
            vertex_count,
            index_count: vertex_count,
        })
    }

    /// Bind the buffers and issue the indexed draw for this frame.
    pub fn render(&self, backend: &B, pass: &mut B::Pass<'_>) {
        backend.bind_and_draw(
            pass,
            &self.vertex_buffer,
            &self.index_buffer,
            GpuVertex::STRIDE,
            self.index_count,
        );
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Texture handle for slot 0 (colour) or 1 (normal map).
    pub fn texture(&self, index: usize) -> Option<&T> {
        self.textures.get(index)
    }

    pub fn textures(&self) -> &TextureSet<T> {
        &self.textures
    }

    pub fn cpu_copy(&self) -> Option<&ModelRecord> {
        self.cpu_copy.as_ref()
    }

    /// Release buffers, then textures, then the CPU copy.
    pub fn shutdown(self) {
        let Mesh {
            vertex_buffer,
            index_buffer,
            textures,
            cpu_copy,
            ..
        } = self;
        drop(vertex_buffer);
        drop(index_buffer);
        log::debug!("Released model buffers");
        drop(textures);
        log::debug!("Released model textures");
        drop(cpu_copy);
    }
}
