//! wgpu implementation of [`RenderBackend`] and [`TextureProvider`].

use std::path::Path;

use asset::TextureData;
use corelib::ResourceError;
use wgpu::{
    Backends, Buffer, BufferUsages, Device, DeviceDescriptor, ErrorFilter, Extent3d, Features,
    IndexFormat, Instance, InstanceDescriptor, Limits, PowerPreference, Queue, RenderPass,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor,
    util::{BufferInitDescriptor, DeviceExt, TextureDataOrder},
};

use crate::backend::{GpuVertex, RenderBackend, TextureProvider, TextureSlot};

/// Device + queue used to create model resources.
pub struct WgpuBackend {
    device: Device,
    queue: Queue,
}

/// Uploaded texture and the view shaders bind.
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: TextureView,
    width: u32,
    height: u32,
}

impl GpuTexture {
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl WgpuBackend {
    pub fn new(device: Device, queue: Queue) -> Self {
        Self { device, queue }
    }

    /// Request an adapter and device without a surface.
    pub fn headless(backends: Backends) -> Result<Self, ResourceError> {
        pollster::block_on(Self::request_headless(backends))
    }

    async fn request_headless(backends: Backends) -> Result<Self, ResourceError> {
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ResourceError::NoAdapter(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Model Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| ResourceError::NoAdapter(e.to_string()))?;

        Ok(Self::new(device, queue))
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Run `create` inside validation and out-of-memory error scopes.
    /// On error the created resource is dropped before returning.
    fn checked<R>(&self, label: &str, create: impl FnOnce(&Device) -> R) -> Result<R, ResourceError> {
        self.device.push_error_scope(ErrorFilter::OutOfMemory);
        self.device.push_error_scope(ErrorFilter::Validation);
        let resource = create(&self.device);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        match validation.or(out_of_memory) {
            Some(err) => Err(ResourceError::Allocation {
                label: label.to_string(),
                message: err.to_string(),
            }),
            None => Ok(resource),
        }
    }
}

impl RenderBackend for WgpuBackend {
    type VertexBuffer = Buffer;
    type IndexBuffer = Buffer;
    type Pass<'p> = RenderPass<'p>;

    fn create_vertex_buffer(&self, label: &str, vertices: &[GpuVertex]) -> Result<Buffer, ResourceError> {
        self.checked(label, |device| {
            device.create_buffer_init(&BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: BufferUsages::VERTEX,
            })
        })
    }

    fn create_index_buffer(&self, label: &str, indices: &[u32]) -> Result<Buffer, ResourceError> {
        self.checked(label, |device| {
            device.create_buffer_init(&BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(indices),
                usage: BufferUsages::INDEX,
            })
        })
    }

    fn bind_and_draw(
        &self,
        pass: &mut Self::Pass<'_>,
        vertices: &Buffer,
        indices: &Buffer,
        stride: u32,
        index_count: u32,
    ) {
        // Stride lives in the pipeline's vertex layout.
        debug_assert_eq!(stride, GpuVertex::STRIDE);
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.set_index_buffer(indices.slice(..), IndexFormat::Uint32);
        pass.draw_indexed(0..index_count, 0, 0..1);
    }
}

impl TextureProvider for WgpuBackend {
    type Texture = GpuTexture;

    fn load_texture(&self, path: &Path, slot: TextureSlot) -> Result<GpuTexture, ResourceError> {
        let data = TextureData::load(path).map_err(|e| ResourceError::Texture {
            path: path.to_path_buf(),
            message: format!("{e:#}"),
        })?;

        let format = match slot {
            TextureSlot::Color => TextureFormat::Rgba8UnormSrgb,
            TextureSlot::Normal => TextureFormat::Rgba8Unorm,
        };
        let label = format!("{:?} map {}", slot, path.display());

        let texture = self.checked(&label, |device| {
            device.create_texture_with_data(
                &self.queue,
                &TextureDescriptor {
                    label: Some(&label),
                    size: Extent3d {
                        width: data.width,
                        height: data.height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: TextureDimension::D2,
                    format,
                    usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
                    view_formats: &[],
                },
                TextureDataOrder::LayerMajor,
                &data.data,
            )
        })?;
        let view = texture.create_view(&TextureViewDescriptor::default());

        Ok(GpuTexture {
            texture,
            view,
            width: data.width,
            height: data.height,
        })
    }
}
