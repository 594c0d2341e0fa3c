//! wgpu render backend.
//!
//! Each particle group gets two instance-stepped vertex buffers: a per-frame
//! transform buffer and a color buffer written once. The tree is drawn with
//! depth testing under the tree's world rotation; the overlay (focus card and
//! hover ring) is drawn afterwards in world space, always on top.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::OrbitCamera;
use crate::error::GpuError;
use crate::sink::{ColorRaw, InstanceColor, InstanceRaw, InstanceSink, InstanceTransform, Overlay};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SHADER_SOURCE: &str = include_str!("particles.wgsl");
const VERTICES_PER_INSTANCE: u32 = 6;
/// Focus card plus hover ring.
const OVERLAY_CAPACITY: usize = 2;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    tree_model: [[f32; 4]; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    time: f32,
    _padding: [f32; 3],
}

impl Uniforms {
    fn new(camera: &OrbitCamera, aspect: f32, tree_model: Mat4, time: f32) -> Self {
        let view = camera.view_matrix();
        // Rows of the view rotation are the camera basis in world space.
        let right = view.row(0).truncate();
        let up = view.row(1).truncate();
        Self {
            view_proj: camera.view_proj(aspect).to_cols_array_2d(),
            tree_model: tree_model.to_cols_array_2d(),
            camera_right: right.extend(0.0).to_array(),
            camera_up: up.extend(0.0).to_array(),
            time,
            _padding: [0.0; 3],
        }
    }
}

/// Instance buffers for one group.
struct InstanceBuffers {
    transforms: wgpu::Buffer,
    colors: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl InstanceBuffers {
    fn new(device: &wgpu::Device, label: &str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let buffer = |suffix: &str, stride: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{label} {suffix}")),
                size: (capacity * stride) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        Self {
            transforms: buffer("Transforms", std::mem::size_of::<InstanceRaw>()),
            colors: buffer("Colors", std::mem::size_of::<ColorRaw>()),
            capacity,
            count: 0,
        }
    }
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,
    tree_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    tree_uniforms: wgpu::Buffer,
    tree_bind_group: wgpu::BindGroup,
    overlay_uniforms: wgpu::Buffer,
    overlay_bind_group: wgpu::BindGroup,
    groups: Vec<InstanceBuffers>,
    overlay: InstanceBuffers,
    /// Reused conversion buffers.
    raw_transforms: Vec<InstanceRaw>,
    raw_colors: Vec<ColorRaw>,
}

impl Renderer {
    /// Set up the surface and pipelines for `window`.
    ///
    /// `group_sizes` pre-allocates one set of instance buffers per group.
    pub async fn new(window: Arc<Window>, group_sizes: &[usize]) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoAdapter)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_buffer = |label: &str| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&Uniforms::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let bind_group = |label: &str, buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &uniform_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };
        let tree_uniforms = uniform_buffer("Tree Uniforms");
        let tree_bind_group = bind_group("Tree Bind Group", &tree_uniforms);
        let overlay_uniforms = uniform_buffer("Overlay Uniforms");
        let overlay_bind_group = bind_group("Overlay Bind Group", &overlay_uniforms);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let tree_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            "Tree Pipeline",
            wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            },
        );
        let overlay_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            "Overlay Pipeline",
            wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            },
        );

        let groups = group_sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| InstanceBuffers::new(&device, &format!("Group {i}"), n))
            .collect();
        let overlay = InstanceBuffers::new(&device, "Overlay", OVERLAY_CAPACITY);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            tree_pipeline,
            overlay_pipeline,
            tree_uniforms,
            tree_bind_group,
            overlay_uniforms,
            overlay_bind_group,
            groups,
            overlay,
            raw_transforms: Vec::new(),
            raw_colors: Vec::new(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        winit::dpi::PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    /// Draw the last submitted instances.
    pub fn render(&mut self, camera: &OrbitCamera, tree: Quat, time: f32) -> Result<(), wgpu::SurfaceError> {
        let aspect = self.aspect();
        let tree_uniforms = Uniforms::new(camera, aspect, Mat4::from_quat(tree), time);
        let overlay_uniforms = Uniforms::new(camera, aspect, Mat4::IDENTITY, time);
        self.queue.write_buffer(&self.tree_uniforms, 0, bytemuck::bytes_of(&tree_uniforms));
        self.queue.write_buffer(&self.overlay_uniforms, 0, bytemuck::bytes_of(&overlay_uniforms));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.01,
                            g: 0.02,
                            b: 0.04,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.tree_pipeline);
            render_pass.set_bind_group(0, &self.tree_bind_group, &[]);
            for group in self.groups.iter().filter(|g| g.count > 0) {
                render_pass.set_vertex_buffer(0, group.transforms.slice(..));
                render_pass.set_vertex_buffer(1, group.colors.slice(..));
                render_pass.draw(0..VERTICES_PER_INSTANCE, 0..group.count);
            }

            if self.overlay.count > 0 {
                render_pass.set_pipeline(&self.overlay_pipeline);
                render_pass.set_bind_group(0, &self.overlay_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.overlay.transforms.slice(..));
                render_pass.set_vertex_buffer(1, self.overlay.colors.slice(..));
                render_pass.draw(0..VERTICES_PER_INSTANCE, 0..self.overlay.count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Make sure `group` has buffers for at least `len` instances.
    fn ensure_group(&mut self, group: usize, len: usize) {
        while self.groups.len() <= group {
            let label = format!("Group {}", self.groups.len());
            self.groups.push(InstanceBuffers::new(&self.device, &label, len));
        }
        if self.groups[group].capacity < len {
            log::debug!("growing group {group} buffers to {len}");
            self.groups[group] = InstanceBuffers::new(&self.device, &format!("Group {group}"), len);
        }
    }
}

impl InstanceSink for Renderer {
    fn write_colors(&mut self, group: usize, colors: &[InstanceColor]) {
        self.ensure_group(group, colors.len());
        self.raw_colors.clear();
        self.raw_colors.extend(colors.iter().map(InstanceColor::to_raw));
        self.queue
            .write_buffer(&self.groups[group].colors, 0, bytemuck::cast_slice(&self.raw_colors));
    }

    fn write_transforms(&mut self, group: usize, transforms: &[InstanceTransform]) {
        self.ensure_group(group, transforms.len());
        self.raw_transforms.clear();
        self.raw_transforms.extend(transforms.iter().map(InstanceTransform::to_raw));
        let buffers = &mut self.groups[group];
        buffers.count = transforms.len() as u32;
        self.queue
            .write_buffer(&buffers.transforms, 0, bytemuck::cast_slice(&self.raw_transforms));
    }

    fn write_overlay(&mut self, overlay: &Overlay) {
        self.raw_transforms.clear();
        self.raw_colors.clear();
        for item in overlay.items().take(OVERLAY_CAPACITY) {
            self.raw_transforms.push(item.transform.to_raw());
            self.raw_colors.push(item.color.to_raw());
        }
        self.overlay.count = self.raw_transforms.len() as u32;
        if self.overlay.count > 0 {
            self.queue
                .write_buffer(&self.overlay.transforms, 0, bytemuck::cast_slice(&self.raw_transforms));
            self.queue
                .write_buffer(&self.overlay.colors, 0, bytemuck::cast_slice(&self.raw_colors));
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    depth: wgpu::DepthStencilState,
) -> wgpu::RenderPipeline {
    const TRANSFORM_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x4,
        1 => Float32x4,
        2 => Float32x4,
        3 => Float32x4
    ];
    const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        4 => Float32x3,
        5 => Uint32
    ];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &TRANSFORM_ATTRIBUTES,
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<ColorRaw>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &COLOR_ATTRIBUTES,
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
        depth_stencil: Some(depth),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
