use std::borrow::Cow;
use std::sync::Arc;

use pollster::block_on;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::texture::{Texture, TextureError};
use crate::utils::FramePool;

/// GPU resources a [`Drawable`] exposes for one draw. The vertex buffer is
/// required; UVs, colours, and the texture are optional, and their presence
/// selects the pipeline the renderer binds.
pub struct DrawBindings<'a> {
    pub vertices: &'a wgpu::Buffer,
    pub uvs: Option<&'a wgpu::Buffer>,
    pub colors: Option<&'a wgpu::Buffer>,
    pub texture: Option<&'a Texture>,
}

/// The seam between draw-data producers (Batch) and the shader consumer.
///
/// `predraw` uploads whatever is pending and returns the vertex count to
/// submit; returning 0 skips the draw. `bindings` exposes the buffers bound
/// for that draw.
pub trait Drawable {
    fn predraw(&mut self, queue: &wgpu::Queue) -> u32;
    fn bindings(&self) -> Option<DrawBindings<'_>>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ViewportUniform {
    size: [f32; 2],
    _pad: [f32; 2],
}

/// Owns the surface, device, and the two quad pipelines (textured and
/// solid), and runs exactly one render pass per frame over the drawables it
/// is handed. All rendering is synchronous inside [`Renderer::frame`].
pub struct Renderer<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    textured_pipeline: wgpu::RenderPipeline,
    solid_pipeline: wgpu::RenderPipeline,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    viewport_buffer: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
    // Shared colour stream for drawables without one, grown on demand.
    white_colors: wgpu::Buffer,
    white_capacity: u32,
    scratch: FramePool,
    pub clear_color: wgpu::Color,
}

impl<'w> Renderer<'w> {
    pub fn new(
        surface: wgpu::Surface<'w>,
        instance: wgpu::Instance,
        size: PhysicalSize<u32>,
    ) -> Self {
        let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .expect("Failed to find an appropriate adapter");

        let (device, queue) = block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .expect("Failed to create device");

        let config = wgpu::SurfaceConfiguration {
            desired_maximum_frame_latency: 2,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![wgpu::TextureFormat::Bgra8UnormSrgb],
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
        };

        surface.configure(&device, &config);

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let viewport_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("viewport_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<ViewportUniform>() as _,
                        ),
                    },
                    count: None,
                }],
            });

        let viewport = ViewportUniform {
            size: [size.width as f32, size.height as f32],
            _pad: [0.0, 0.0],
        };
        let viewport_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Viewport Uniform Buffer"),
            contents: bytemuck::bytes_of(&viewport),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &viewport_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &viewport_buffer,
                    offset: 0,
                    size: None,
                }),
            }],
            label: Some("Viewport Bind Group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: None,
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("../shaders/quad.wgsl"))),
        });

        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Textured Pipeline Layout"),
            bind_group_layouts: &[&viewport_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let solid_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Solid Pipeline Layout"),
            bind_group_layouts: &[&viewport_bind_group_layout],
            push_constant_ranges: &[],
        });

        let position_layout = wgpu::VertexBufferLayout {
            array_stride: (2 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2],
        };
        let uv_layout = wgpu::VertexBufferLayout {
            array_stride: (2 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![1 => Float32x2],
        };
        let textured_color_layout = wgpu::VertexBufferLayout {
            array_stride: 4,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![2 => Unorm8x4],
        };
        let solid_color_layout = wgpu::VertexBufferLayout {
            array_stride: 4,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![1 => Unorm8x4],
        };

        let target = [Some(wgpu::ColorTargetState {
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let textured_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Textured Quad Pipeline"),
            layout: Some(&textured_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_textured"),
                buffers: &[
                    position_layout.clone(),
                    uv_layout,
                    textured_color_layout,
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_textured"),
                targets: &target,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let solid_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Solid Quad Pipeline"),
            layout: Some(&solid_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_solid"),
                buffers: &[position_layout, solid_color_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_solid"),
                targets: &target,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let white_colors = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("White Colour Buffer"),
            contents: &[255u8; 6 * 4],
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            surface,
            device,
            queue,
            config,
            textured_pipeline,
            solid_pipeline,
            texture_bind_group_layout,
            viewport_buffer,
            viewport_bind_group,
            white_colors,
            white_capacity: 6,
            scratch: FramePool::new(),
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.12,
                a: 1.0,
            },
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Per-frame scratch arena; refreshed at the top of [`Renderer::frame`].
    pub fn scratch(&mut self) -> &mut FramePool {
        &mut self.scratch
    }

    /// Uploads raw RGBA8 pixels as a new texture.
    pub fn create_texture(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Arc<Texture>, TextureError> {
        Texture::from_rgba(
            &self.device,
            &self.queue,
            &self.texture_bind_group_layout,
            pixels,
            width,
            height,
        )
        .map(Arc::new)
    }

    /// Decodes PNG/JPEG bytes and uploads them as a new texture.
    pub fn load_texture(&self, bytes: &[u8]) -> Result<Arc<Texture>, TextureError> {
        Texture::from_encoded(
            &self.device,
            &self.queue,
            &self.texture_bind_group_layout,
            bytes,
        )
        .map(Arc::new)
    }

    pub fn resize(&mut self, new_size: &PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        let viewport = ViewportUniform {
            size: [new_size.width as f32, new_size.height as f32],
            _pad: [0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.viewport_buffer, 0, bytemuck::bytes_of(&viewport));
    }

    /// Runs one render pass: predraw every drawable, then bind and draw each
    /// non-empty one in paint order, then present. Submission is synchronous.
    pub fn frame(
        &mut self,
        drawables: &mut [&mut dyn Drawable],
    ) -> Result<(), wgpu::SurfaceError> {
        self.scratch.refresh();

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Upload phase, outside the pass: buffer writes and any growth of
        // the shared white colour stream must happen before binding.
        let mut counts = Vec::with_capacity(drawables.len());
        let mut white_needed = 0u32;
        for drawable in drawables.iter_mut() {
            let count = drawable.predraw(&self.queue);
            if count > 0 {
                if let Some(bindings) = drawable.bindings() {
                    if bindings.colors.is_none() {
                        white_needed = white_needed.max(count);
                    }
                }
            }
            counts.push(count);
        }
        if white_needed > self.white_capacity {
            self.white_colors =
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("White Colour Buffer"),
                        contents: &vec![255u8; white_needed as usize * 4],
                        usage: wgpu::BufferUsages::VERTEX,
                    });
            self.white_capacity = white_needed;
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (drawable, &count) in drawables.iter().zip(&counts) {
                if count == 0 {
                    continue;
                }
                let Some(bindings) = drawable.bindings() else {
                    continue;
                };
                let colors = bindings.colors.unwrap_or(&self.white_colors);
                match (bindings.uvs, bindings.texture) {
                    (Some(uvs), Some(texture)) => {
                        rpass.set_pipeline(&self.textured_pipeline);
                        rpass.set_bind_group(0, &self.viewport_bind_group, &[]);
                        rpass.set_bind_group(1, texture.bind_group(), &[]);
                        rpass.set_vertex_buffer(0, bindings.vertices.slice(..));
                        rpass.set_vertex_buffer(1, uvs.slice(..));
                        rpass.set_vertex_buffer(2, colors.slice(..));
                    }
                    _ => {
                        rpass.set_pipeline(&self.solid_pipeline);
                        rpass.set_bind_group(0, &self.viewport_bind_group, &[]);
                        rpass.set_vertex_buffer(0, bindings.vertices.slice(..));
                        rpass.set_vertex_buffer(1, colors.slice(..));
                    }
                }
                rpass.draw(0..count, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
