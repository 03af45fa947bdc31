//! Renderer: upload finished models to the GPU and draw them.
//!
//! [`RenderBackend`] and [`TextureProvider`] are the seams to the graphics
//! API; [`WgpuBackend`] implements both on top of wgpu.

pub mod backend;
pub mod mesh;
pub mod textures;
pub mod wgpu_backend;

pub use backend::{GpuVertex, RenderBackend, TextureProvider, TextureSlot};
pub use mesh::{Mesh, MeshDesc};
pub use textures::TextureSet;
pub use wgpu_backend::{GpuTexture, WgpuBackend};
