//! Single-pass wgpu implementation of the color grade.
//!
//! [`GpuColorGrade`] owns the device/queue pair, created on first use. Every `grade` call builds
//! its texture, shader, pipeline and buffers inside a [`GradeScope`] that is torn down before the
//! call returns.

use crate::config::ColorGradeParams;
use crate::effects::color_grade::apply_color_grade;
use crate::foundation::buffer::PixelBuffer;
use crate::foundation::error::{SkyError, SkyResult};
use crate::render::backend::ColorGradeBackend;

const SHADER: &str = r#"
struct Params {
  white_intensity: f32,
  white_threshold: f32,
  blue_intensity: f32,
  blue_threshold: f32,
};

@group(0) @binding(0) var t_src: texture_2d<f32>;
@group(0) @binding(1) var<uniform> params: Params;

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> @builtin(position) vec4<f32> {
  var p = array<vec2<f32>, 3>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 3.0, -1.0),
    vec2<f32>(-1.0,  3.0),
  );
  return vec4<f32>(p[vi], 0.0, 1.0);
}

@fragment
fn fs(@builtin(position) pos: vec4<f32>) -> @location(0) vec4<f32> {
  let c = textureLoad(t_src, vec2<i32>(pos.xy), 0);
  let b = (c.r + c.g + c.b) / 3.0;
  var rgb = c.rgb;
  if (b > params.white_threshold) {
    let k = (b - params.white_threshold) / (1.0 - params.white_threshold) * params.white_intensity;
    rgb = c.rgb + (vec3<f32>(1.0) - c.rgb) * k;
  } else if (b < params.blue_threshold) {
    let k = (params.blue_threshold - b) / params.blue_threshold * params.blue_intensity;
    rgb = vec3<f32>(c.r - c.r * k, c.g - c.g * k, c.b + (1.0 - c.b) * k);
  }
  return vec4<f32>(clamp(rgb, vec3<f32>(0.0), vec3<f32>(1.0)), c.a);
}
"#;

struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuContext {
    fn acquire() -> SkyResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                SkyError::gpu_init("no gpu adapter available")
            }
            other => SkyError::gpu_init(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("skyfx_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| SkyError::gpu_init(format!("wgpu request_device failed: {e:?}")))?;

        tracing::debug!(adapter = ?adapter.get_info().name, "gpu color grade initialized");
        Ok(Self { device, queue })
    }
}

/// Resources for one `grade` call. Textures and buffers are destroyed on drop.
struct GradeScope {
    src: wgpu::Texture,
    dst: wgpu::Texture,
    params: wgpu::Buffer,
    readback: wgpu::Buffer,
    padded_row_bytes: u32,
}

impl Drop for GradeScope {
    fn drop(&mut self) {
        self.src.destroy();
        self.dst.destroy();
        self.params.destroy();
        self.readback.destroy();
    }
}

/// GPU color grade backend.
#[derive(Default)]
pub struct GpuColorGrade {
    ctx: Option<GpuContext>,
}

impl GpuColorGrade {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&mut self) -> SkyResult<&GpuContext> {
        if self.ctx.is_none() {
            self.ctx = Some(GpuContext::acquire()?);
        }
        self.ctx
            .as_ref()
            .ok_or_else(|| SkyError::gpu_init("gpu context missing after init"))
    }
}

impl ColorGradeBackend for GpuColorGrade {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn grade(&mut self, input: &PixelBuffer, params: &ColorGradeParams) -> SkyResult<PixelBuffer> {
        params.validate()?;
        if input.is_empty() {
            return Ok(input.clone());
        }
        let ctx = self.context()?;
        let (width, height) = (input.width(), input.height());
        let limit = ctx.device.limits().max_texture_dimension_2d;
        if width > limit || height > limit {
            tracing::debug!(
                width,
                height,
                limit,
                "image exceeds gpu texture limit; grading on cpu"
            );
            return apply_color_grade(input, params);
        }

        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let result = run_grade(ctx, input, params);
        if let Some(err) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(SkyError::gpu_init(format!("wgpu validation failed: {err}")));
        }
        result
    }
}

fn run_grade(
    ctx: &GpuContext,
    input: &PixelBuffer,
    params: &ColorGradeParams,
) -> SkyResult<PixelBuffer> {
    let device = &ctx.device;
    let queue = &ctx.queue;
    let (width, height) = (input.width(), input.height());
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let (row_bytes, padded_row_bytes, readback_size) = readback_layout(width, height)?;

    let texture = |label, usage| {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage,
            view_formats: &[],
        })
    };
    let scope = GradeScope {
        src: texture(
            "skyfx_grade_src",
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        ),
        dst: texture(
            "skyfx_grade_dst",
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        ),
        params: device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("skyfx_grade_params"),
            size: 16,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }),
        readback: device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("skyfx_grade_readback"),
            size: readback_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }),
        padded_row_bytes,
    };

    queue.write_texture(
        scope.src.as_image_copy(),
        input.as_bytes(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(row_bytes),
            rows_per_image: Some(height),
        },
        extent,
    );
    queue.write_buffer(&scope.params, 0, &params_bytes(params));

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("skyfx_grade_bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(16),
                },
                count: None,
            },
        ],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("skyfx_grade_shader"),
        source: wgpu::ShaderSource::Wgsl(SHADER.into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("skyfx_grade_pl"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("skyfx_grade_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: wgpu::TextureFormat::Rgba8Unorm,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    let src_view = scope.src.create_view(&wgpu::TextureViewDescriptor::default());
    let dst_view = scope.dst.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("skyfx_grade_bg"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&src_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: scope.params.as_entire_binding(),
            },
        ],
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("skyfx_grade_encoder"),
    });
    {
        let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("skyfx_grade_rp"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &dst_view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rp.set_pipeline(&pipeline);
        rp.set_bind_group(0, &bind_group, &[]);
        rp.draw(0..3, 0..1);
    }
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &scope.dst,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &scope.readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(scope.padded_row_bytes),
                rows_per_image: Some(height),
            },
        },
        extent,
    );
    queue.submit(Some(encoder.finish()));

    let pixels = read_back(device, &scope, row_bytes as usize, height as usize)?;
    PixelBuffer::from_raw(width, height, pixels)
}

fn read_back(
    device: &wgpu::Device,
    scope: &GradeScope,
    row_bytes: usize,
    height: usize,
) -> SkyResult<Vec<u8>> {
    let slice = scope.readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| SkyError::gpu_init(format!("wgpu poll failed: {e:?}")))?;
    rx.recv()
        .map_err(|_| SkyError::gpu_init("readback channel closed"))?
        .map_err(|e| SkyError::gpu_init(format!("readback map failed: {e:?}")))?;

    let mapped = slice.get_mapped_range();
    let padded = scope.padded_row_bytes as usize;
    let mut out = Vec::with_capacity(row_bytes * height);
    for row in 0..height {
        let start = row * padded;
        out.extend_from_slice(&mapped[start..start + row_bytes]);
    }
    drop(mapped);
    scope.readback.unmap();
    Ok(out)
}

fn params_bytes(p: &ColorGradeParams) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (i, v) in [
        p.white_intensity,
        p.white_threshold,
        p.blue_intensity,
        p.blue_threshold,
    ]
    .into_iter()
    .enumerate()
    {
        out[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
    }
    out
}

/// `(row_bytes, padded_row_bytes, readback_size)` for a `width` x `height` RGBA8 copy.
///
/// Sizes the device cannot address count as an unusable gpu, so the stage degrades to the cpu
/// instead of failing every frame.
fn readback_layout(width: u32, height: u32) -> SkyResult<(u32, u32, u64)> {
    let row_bytes = width
        .checked_mul(4)
        .ok_or_else(|| SkyError::gpu_init("gpu row size overflow"))?;
    let padded_row_bytes = align_to(row_bytes, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        .ok_or_else(|| SkyError::gpu_init("gpu padded row size overflow"))?;
    let readback_size = u64::from(padded_row_bytes)
        .checked_mul(u64::from(height))
        .ok_or_else(|| SkyError::gpu_init("gpu readback size overflow"))?;
    Ok((row_bytes, padded_row_bytes, readback_size))
}

fn align_to(value: u32, alignment: u32) -> Option<u32> {
    value.div_ceil(alignment).checked_mul(alignment)
}
