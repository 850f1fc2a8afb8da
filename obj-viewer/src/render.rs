use anyhow::{bail, Context, Result};
use bytemuck::{Pod, Zeroable};
use meshindex::{FaceVertex, IndexedMesh, TextureData, TextureFormat as CpuFormat};
use nalgebra::{Matrix4, Vector3};
use std::borrow::Cow;
use std::mem::size_of;
use wgpu::util::{BufferInitDescriptor, DeviceExt};
use wgpu::{
    vertex_attr_array, AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, Buffer,
    BufferBindingType, BufferUsages, Color, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, CompareFunction, DepthStencilState, Device, DeviceDescriptor, Face,
    Features, FilterMode, FragmentState, Instance, Limits, LoadOp, MultisampleState, Operations,
    PipelineLayoutDescriptor, PowerPreference, PresentMode, PrimitiveState, PushConstantRange,
    Queue, RenderPassColorAttachment, RenderPassDepthStencilAttachment, RenderPassDescriptor,
    RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions, SamplerBindingType,
    SamplerDescriptor, ShaderModule, ShaderSource, ShaderStages, Surface, SurfaceConfiguration,
    SurfaceError, TextureDescriptor, TextureFormat, TextureSampleType, TextureUsages, TextureView,
    TextureViewDimension, VertexBufferLayout, VertexState, VertexStepMode,
};
use winit::window::Window;

fn depth(device: &Device, width: u32, height: u32) -> TextureView {
    let depth = device.create_texture(&TextureDescriptor {
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        label: None,
    });
    let view = depth.create_view(&wgpu::TextureViewDescriptor::default());
    view
}

fn gpu_format(format: CpuFormat) -> TextureFormat {
    match format {
        CpuFormat::Rgba8 => TextureFormat::Rgba8UnormSrgb,
        CpuFormat::Bc1 => TextureFormat::Bc1RgbaUnormSrgb,
        CpuFormat::Bc2 => TextureFormat::Bc2RgbaUnormSrgb,
        CpuFormat::Bc3 => TextureFormat::Bc3RgbaUnormSrgb,
    }
}

// matches `Lighting` in shader.wgsl; vec3s padded out to vec4
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Lighting {
    light_position: [f32; 4],
    camera_position: [f32; 4],
    tint: [f32; 4],
}

// above and in front of the model, roughly where the default camera is
const LIGHT_POSITION: [f32; 4] = [4.0, 4.0, 4.0, 1.0];

pub struct RenderState {
    // surface/instance
    _instance: Instance,
    surface: Surface,
    surface_cfg: SurfaceConfiguration,
    // device/queue
    device: Device,
    queue: Queue,
    // rendering infrastructure
    _shader: ShaderModule,
    render_pipeline: RenderPipeline,
    // texture, sampler and lighting
    bind_group: BindGroup,
    lighting_buffer: Buffer,
    // model buffer, vertices then indices
    model_buffer: Buffer,
    idx_offset: u64,
    idx_count: u32,
    // model depth texture
    depth_view: TextureView,
}

impl RenderState {
    pub fn create(window: &Window, mesh: &IndexedMesh, texture: &TextureData) -> Result<Self> {
        let instance = Instance::new(wgpu::Backends::all());
        let surface = unsafe { instance.create_surface(&window) };
        let adapter = futures::executor::block_on(async {
            instance
                .request_adapter(&RequestAdapterOptions {
                    power_preference: PowerPreference::HighPerformance,
                    force_fallback_adapter: false,
                    compatible_surface: Some(&surface),
                })
                .await
        })
        .context("no suitable graphics adapter")?;
        log::info!("Chose the adapter: {:?}", adapter.get_info());

        // dds textures need bc support, which not every adapter has
        let bc = adapter.features() & Features::TEXTURE_COMPRESSION_BC;
        if texture.format != CpuFormat::Rgba8 {
            if bc.is_empty() {
                bail!("adapter cannot sample {:?} compressed textures", texture.format);
            }
            if texture.width % 4 != 0 || texture.height % 4 != 0 {
                bail!(
                    "compressed texture is {}x{}, needs to be a multiple of 4",
                    texture.width,
                    texture.height
                );
            }
        }

        let format = *surface
            .get_supported_formats(&adapter)
            .first()
            .context("surface is incompatible with the adapter")?;
        let (width, height) = window.inner_size().into();
        let surface_cfg = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: PresentMode::Fifo,
        };
        let (device, queue) = futures::executor::block_on(async {
            adapter
                .request_device(
                    &DeviceDescriptor {
                        label: None,
                        features: Features::PUSH_CONSTANTS | bc,
                        limits: Limits {
                            // supported on basically every platform
                            max_push_constant_size: 128,
                            ..Default::default()
                        },
                    },
                    None,
                )
                .await
        })
        .context("failed to open the graphics device")?;
        surface.configure(&device, &surface_cfg);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: None,
            source: ShaderSource::Wgsl(Cow::Borrowed(include_str!("shader.wgsl"))),
        });

        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: None,
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let tex = device.create_texture_with_data(
            &queue,
            &TextureDescriptor {
                label: None,
                size: wgpu::Extent3d {
                    width: texture.width,
                    height: texture.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: texture.mip_count(),
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: gpu_format(texture.format),
                usage: TextureUsages::COPY_DST | TextureUsages::TEXTURE_BINDING,
            },
            &texture.packed(),
        );
        let tex_view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        // repeat so the negated v of flipped uvs wraps back into [0, 1]
        let sampler = device.create_sampler(&SamplerDescriptor {
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Linear,
            ..Default::default()
        });
        let lighting_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: None,
            contents: bytemuck::bytes_of(&Lighting {
                light_position: LIGHT_POSITION,
                camera_position: [0.0, 0.0, 5.0, 1.0],
                tint: [1.0; 4],
            }),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout: &bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&tex_view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&sampler),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: lighting_buffer.as_entire_binding(),
                },
            ],
        });

        let render_pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[PushConstantRange {
                stages: ShaderStages::VERTEX,
                // view-projection then model
                range: 0..128,
            }],
        });
        let render_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: None,
            layout: Some(&render_pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[VertexBufferLayout {
                    array_stride: size_of::<FaceVertex>() as u64,
                    step_mode: VertexStepMode::Vertex,
                    // position, uv, normal
                    attributes: &vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3],
                }],
            },
            // triangles, counter-clockwise, back faces culled
            primitive: PrimitiveState {
                cull_mode: Some(Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                // no stencil
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: MultisampleState::default(),
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(ColorTargetState {
                    format,
                    blend: None,
                    write_mask: ColorWrites::COLOR,
                })],
            }),
            multiview: None,
        });

        // the first part of the buffer for vertices, latter part indices
        let vertex_bytes = mesh.vertex_bytes();
        let mut model_bytes = Vec::with_capacity(vertex_bytes.len() + mesh.index_bytes().len());
        model_bytes.extend_from_slice(vertex_bytes);
        model_bytes.extend_from_slice(mesh.index_bytes());
        let idx_count = u32::try_from(mesh.indices.len()).context("too many indices to draw")?;
        let model_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: None,
            contents: &model_bytes,
            usage: BufferUsages::VERTEX | BufferUsages::INDEX,
        });
        log::info!(
            "uploaded {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        let depth_view = depth(&device, width, height);
        Ok(Self {
            _instance: instance,
            surface,
            surface_cfg,
            device,
            queue,
            _shader: shader,
            render_pipeline,
            bind_group,
            lighting_buffer,
            model_buffer,
            idx_offset: vertex_bytes.len() as u64,
            idx_count,
            depth_view,
        })
    }

    pub fn aspect(&self) -> f32 {
        self.surface_cfg.width as f32 / self.surface_cfg.height.max(1) as f32
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_cfg.width, self.surface_cfg.height)
    }

    pub fn resize(&mut self, (width, height): (u32, u32)) {
        // minimized; a zero sized surface can't be configured
        if width == 0 || height == 0 {
            return;
        }
        self.surface_cfg.width = width;
        self.surface_cfg.height = height;
        self.surface.configure(&self.device, &self.surface_cfg);
        self.depth_view = depth(&self.device, width, height);
    }

    pub fn update_lighting(&self, camera_position: Vector3<f32>, tint: [f32; 3]) {
        let lighting = Lighting {
            light_position: LIGHT_POSITION,
            camera_position: camera_position.push(1.0).into(),
            tint: [tint[0], tint[1], tint[2], 1.0],
        };
        self.queue
            .write_buffer(&self.lighting_buffer, 0, bytemuck::bytes_of(&lighting));
    }

    pub fn render(
        &self,
        projview: &Matrix4<f32>,
        model: &Matrix4<f32>,
    ) -> Result<(), SurfaceError> {
        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor { label: None });
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });
            rpass.set_pipeline(&self.render_pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_push_constants(
                ShaderStages::VERTEX,
                0,
                bytemuck::cast_slice(projview.as_slice()),
            );
            rpass.set_push_constants(
                ShaderStages::VERTEX,
                64,
                bytemuck::cast_slice(model.as_slice()),
            );
            rpass.set_index_buffer(
                self.model_buffer.slice(self.idx_offset..),
                wgpu::IndexFormat::Uint32,
            );
            rpass.set_vertex_buffer(0, self.model_buffer.slice(..self.idx_offset));
            rpass.draw_indexed(0..self.idx_count, 0, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
