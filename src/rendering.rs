//! Ring shader program: wgpu pipeline, segment geometry and per-bar uniforms.

use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::{FrameError, SetupError};
use crate::ring::{Bar, SEGMENT_CORNERS, SEGMENT_INDICES};

/// Uniforms shared by every bar in a frame (combined matrix + bar width)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub projection: [[f32; 4]; 4],
    pub width: f32,
    pub _padding: [f32; 3], // Padding for alignment
}

/// Uniforms for one bar, one dynamic-offset slot each
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BarUniforms {
    pub angle: f32,
    pub height: f32,
    pub _padding0: [f32; 2], // vec3 aligns to 16 bytes
    pub color: [f32; 3],
    pub _padding1: f32,
}

impl From<&Bar> for BarUniforms {
    fn from(bar: &Bar) -> Self {
        Self {
            angle: bar.angle,
            height: bar.height,
            _padding0: [0.0; 2],
            color: bar.color,
            _padding1: 0.0,
        }
    }
}

/// Something that can draw one frame of the ring
pub trait RingTarget {
    /// Current drawable size in pixels
    fn drawable_size(&self) -> (u32, u32);

    /// Clear to black and issue one indexed draw per bar
    fn draw_ring(&mut self, frame: &FrameUniforms, bars: &[BarUniforms])
        -> Result<(), FrameError>;
}

/// Round `size` up to a multiple of `alignment`
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// The compiled ring program and everything it draws with
pub struct RingProgram {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: (u32, u32),
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    bar_buffer: wgpu::Buffer,
    bar_bind_group: wgpu::BindGroup,
    bar_stride: u64,
    bar_slots: usize,
    bar_staging: Vec<u8>,
}

impl RingProgram {
    /// Acquire the GPU, compile the program and upload the segment geometry
    pub async fn new(window: Arc<Window>, bar_count: usize) -> Result<Self, SetupError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance
            .create_surface(window)
            .map_err(|e| SetupError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SetupError::Adapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Ring Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| SetupError::Device(e.to_string()))?;

        // Linear format so colour / 255 reaches the screen unchanged
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| SetupError::Surface("no supported surface format".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface: {}x{} {:?} via {:?}",
            config.width,
            config.height,
            surface_format,
            adapter.get_info().backend
        );

        // Compile and link under an error scope so failures surface here
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Ring Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("ring.wgsl").into()),
        });

        let frame_layout = uniform_layout(
            &device,
            "Frame Bind Group Layout",
            false,
            size_of_u64::<FrameUniforms>(),
        );
        let bar_layout = uniform_layout(
            &device,
            "Bar Bind Group Layout",
            true,
            size_of_u64::<BarUniforms>(),
        );
        let pipeline = create_pipeline(
            &device,
            &shader,
            &[&frame_layout, &bar_layout],
            config.format,
        );
        if let Some(error) = device.pop_error_scope().await {
            return Err(SetupError::ShaderProgram(error.to_string()));
        }

        // Segment geometry, shared by every bar
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Segment Vertex Buffer"),
            contents: bytemuck::cast_slice(&SEGMENT_CORNERS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Segment Index Buffer"),
            contents: bytemuck::cast_slice(&SEGMENT_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::cast_slice(&[FrameUniforms::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        // One aligned slot per bar, addressed by dynamic offset
        let bar_slots = bar_count.max(1);
        let bar_stride = aligned_stride(
            size_of_u64::<BarUniforms>(),
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let bar_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bar Uniform Buffer"),
            size: bar_stride * bar_slots as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bar_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bar Bind Group"),
            layout: &bar_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &bar_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of_u64::<BarUniforms>()),
                }),
            }],
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size: (size.width, size.height),
            pipeline,
            vertex_buffer,
            index_buffer,
            frame_buffer,
            frame_bind_group,
            bar_buffer,
            bar_bind_group,
            bar_stride,
            bar_slots,
            bar_staging: vec![0; (bar_stride * bar_slots as u64) as usize],
        })
    }

    /// Track the window size; zero-sized surfaces are never configured
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

impl RingTarget for RingProgram {
    fn drawable_size(&self) -> (u32, u32) {
        self.size
    }

    fn draw_ring(
        &mut self,
        frame: &FrameUniforms,
        bars: &[BarUniforms],
    ) -> Result<(), FrameError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[*frame]));

        let bars = &bars[..bars.len().min(self.bar_slots)];
        let stride = self.bar_stride as usize;
        for (i, bar) in bars.iter().enumerate() {
            let bytes = bytemuck::bytes_of(bar);
            self.bar_staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        if !bars.is_empty() {
            self.queue
                .write_buffer(&self.bar_buffer, 0, &self.bar_staging[..bars.len() * stride]);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Ring Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Ring Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_viewport(
                0.0,
                0.0,
                self.config.width as f32,
                self.config.height as f32,
                0.0,
                1.0,
            );
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

            for i in 0..bars.len() {
                let offset = (i * stride) as wgpu::DynamicOffset;
                render_pass.set_bind_group(1, &self.bar_bind_group, &[offset]);
                render_pass.draw_indexed(0..SEGMENT_INDICES.len() as u32, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn size_of_u64<T>() -> u64 {
    std::mem::size_of::<T>() as u64
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    has_dynamic_offset: bool,
    size: u64,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset,
                min_binding_size: wgpu::BufferSize::new(size),
            },
            count: None,
        }],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Ring Pipeline Layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Ring Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                }],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADER: &str = include_str!("ring.wgsl");

    fn parse_shader() -> naga::Module {
        naga::front::wgsl::parse_str(SHADER).expect("Parse should succeed")
    }

    fn wgsl_struct_size(module: &naga::Module, name: &str) -> u32 {
        let (_, ty) = module
            .types
            .iter()
            .find(|(_, ty)| ty.name.as_deref() == Some(name))
            .expect("struct should exist");
        ty.inner.size(module.to_ctx())
    }

    #[test]
    fn test_shader_validates() {
        let module = parse_shader();
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        assert!(validator.validate(&module).is_ok());

        let stages: Vec<_> = module
            .entry_points
            .iter()
            .map(|ep| (ep.name.as_str(), ep.stage))
            .collect();
        assert!(stages.contains(&("vs_main", naga::ShaderStage::Vertex)));
        assert!(stages.contains(&("fs_main", naga::ShaderStage::Fragment)));
    }

    #[test]
    fn test_uniform_layouts_match_shader() {
        let module = parse_shader();
        assert_eq!(
            wgsl_struct_size(&module, "FrameUniforms") as usize,
            std::mem::size_of::<FrameUniforms>()
        );
        assert_eq!(
            wgsl_struct_size(&module, "BarUniforms") as usize,
            std::mem::size_of::<BarUniforms>()
        );
    }

    #[test]
    fn test_bar_uniforms_from_bar() {
        let bar = Bar {
            index: 3,
            angle: 8.4375,
            height: 1.25,
            color: [255.0, 0.0, 128.0],
        };
        let uniforms = BarUniforms::from(&bar);
        assert_eq!(uniforms.angle, 8.4375);
        assert_eq!(uniforms.height, 1.25);
        assert_eq!(uniforms.color, [255.0, 0.0, 128.0]);
    }

    #[test]
    fn test_aligned_stride() {
        assert_eq!(aligned_stride(32, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
    }
}
