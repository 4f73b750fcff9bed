// ============================================================================
// GPU RENDERER — segment vertex buffers and offscreen stroke rendering
// ============================================================================
//
// Implements `RenderBackend` on top of wgpu: every buffer segment is one
// fixed-size vertex buffer, slot writes are `queue.write_buffer` uploads, and
// the visible count is the per-segment draw range. `render()` draws the whole
// chain into an offscreen RGBA8 target and reads it back so the UI can show
// it as an egui texture.
//
// The readback is a synchronous map; double-buffered staging would only pay
// off for much heavier frames than a sketch's few thousand triangles.

use bytemuck::{Pod, Zeroable};

use super::context::GpuContext;
use super::shaders;
use crate::consts::VALUES_PER_LINE;
use crate::segment::RenderBackend;
use crate::vector::LineVertices;

const VERTICES_PER_LINE: usize = VALUES_PER_LINE / 3;
const BYTES_PER_LINE: u64 = (VALUES_PER_LINE * std::mem::size_of::<f32>()) as u64;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CameraUniform {
    viewport: [f32; 2],
    offset: [f32; 2],
}

/// One segment's GPU residence: the vertex buffer plus its draw range.
pub struct GpuSegment {
    buffer: wgpu::Buffer,
    visible_lines: usize,
}

impl GpuSegment {
    pub fn visible_lines(&self) -> usize {
        self.visible_lines
    }
}

struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// wgpu implementation of the segment rendering seam.
pub struct GpuBackend {
    context: GpuContext,
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    target: Option<OffscreenTarget>,
    segment_counter: usize,
}

impl GpuBackend {
    pub fn new(context: GpuContext) -> Self {
        let device = &context.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stroke_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::STROKE_SHADER.into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_uniform"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stroke_pipeline_layout"),
            bind_group_layouts: &[&camera_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("stroke_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (3 * std::mem::size_of::<f32>()) as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    }],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8UnormSrgb,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            context,
            pipeline,
            camera_buffer,
            camera_bind_group,
            target: None,
            segment_counter: 0,
        }
    }

    pub fn adapter_name(&self) -> &str {
        &self.context.adapter_name
    }

    fn ensure_target(&mut self, width: u32, height: u32) {
        if let Some(ref t) = self.target {
            if t.width == width && t.height == height {
                return;
            }
        }

        let texture = self.context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("canvas_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.target = Some(OffscreenTarget {
            texture,
            view,
            width,
            height,
        });
    }

    /// Draw the segment chain into the offscreen target and read the frame
    /// back as tightly-packed RGBA bytes.
    ///
    /// `viewport`/`offset` are in working coordinates; the target is sized so
    /// one texel equals one working unit. Returns `None` when the requested
    /// size is zero or beyond device limits.
    pub fn render(
        &mut self,
        segments: &[GpuSegment],
        width: u32,
        height: u32,
        offset: (f32, f32),
    ) -> Option<Vec<u8>> {
        if width == 0 || height == 0 || !self.context.supports_size(width, height) {
            return None;
        }
        self.ensure_target(width, height);
        let target = self.target.as_ref()?;

        let camera = CameraUniform {
            viewport: [width as f32, height as f32],
            offset: [offset.0, offset.1],
        };
        self.context
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera));

        let padded_bytes_per_row = super::align_bytes_per_row(width * 4);
        let readback = self.context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("canvas_readback"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("canvas_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("stroke_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for segment in segments {
                if segment.visible_lines == 0 {
                    continue;
                }
                pass.set_vertex_buffer(0, segment.buffer.slice(..));
                pass.draw(0..(segment.visible_lines * VERTICES_PER_LINE) as u32, 0..1);
            }
        }

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.context.submit_one(encoder);

        // Synchronous map: block until the copy lands, then strip row padding.
        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.context.device.poll(wgpu::Maintain::Wait);
        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                crate::log_err!("canvas readback map failed: {:?}", e);
                return None;
            }
            Err(_) => {
                crate::log_err!("canvas readback channel closed before map completed");
                return None;
            }
        }

        let mapped = slice.get_mapped_range();
        let row_bytes = (width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * padded_bytes_per_row as usize;
            pixels.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        readback.unmap();

        Some(pixels)
    }
}

impl RenderBackend for GpuBackend {
    type Segment = GpuSegment;

    fn create_segment(&mut self, line_capacity: usize) -> GpuSegment {
        let buffer = self.context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("segment_{}", self.segment_counter)),
            size: line_capacity as u64 * BYTES_PER_LINE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.segment_counter += 1;
        GpuSegment {
            buffer,
            visible_lines: 0,
        }
    }

    fn write_slot(&mut self, segment: &mut GpuSegment, slot: usize, vertices: &LineVertices) {
        self.context.queue.write_buffer(
            &segment.buffer,
            slot as u64 * BYTES_PER_LINE,
            bytemuck::cast_slice(vertices),
        );
    }

    fn set_visible_count(&mut self, segment: &mut GpuSegment, lines: usize) {
        segment.visible_lines = lines;
    }

    fn release_segment(&mut self, segment: GpuSegment) {
        segment.buffer.destroy();
    }
}
