use crate::mesh::{GpuMesh, Vertex};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use driftfall_common::Viewport;
use driftfall_render::{RenderError, RenderSurface, Renderer};
use driftfall_scene::SceneContext;
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
    fog_color: [f32; 4],
    fog_range: [f32; 4],
}

impl Globals {
    fn from_scene(scene: &SceneContext) -> Self {
        let camera = &scene.camera;
        let orientation = camera.object.rotation.to_quat();
        let toward_light = -scene.sun.direction();
        let light = scene.sun.color.scaled(scene.sun.intensity);
        let ambient = scene.ambient.color.scaled(scene.ambient.intensity);

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.object.position.extend(1.0).to_array(),
            camera_right: (orientation * Vec3::X).extend(0.0).to_array(),
            camera_up: (orientation * Vec3::Y).extend(0.0).to_array(),
            light_dir: toward_light.extend(0.0).to_array(),
            light_color: light.to_rgba(1.0),
            ambient: ambient.to_rgba(1.0),
            fog_color: scene.fog.color.to_rgba(1.0),
            fog_range: [scene.fog.near, scene.fog.far, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PointUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    size: [f32; 4],
}

impl PointUniforms {
    fn from_scene(scene: &SceneContext) -> Self {
        let cloud = &scene.particles;
        let m = cloud.material;
        let alpha = if m.transparent { m.opacity } else { 1.0 };
        Self {
            model: cloud.object.matrix().to_cols_array_2d(),
            color: m.color.to_rgba(alpha),
            size: [m.size, 0.0, 0.0, 0.0],
        }
    }
}

/// Particle positions as per-instance sprite centers.
struct GpuParticles {
    instance_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    count: u32,
    uploaded_version: Option<u64>,
}

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// wgpu-based scene renderer bound to one presentation surface.
///
/// The host reports what it displays through
/// [`set_display_size`](Self::set_display_size); the surface itself is only
/// reconfigured when the frame driver asks via [`RenderSurface::set_target_size`].
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    display: Viewport,
    mesh_pipeline: wgpu::RenderPipeline,
    points_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    particles: GpuParticles,
    depth_texture: wgpu::TextureView,
}

impl WgpuRenderer {
    /// Bring up a device for `surface` and upload the scene's static geometry.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        display: Viewport,
        scene: &SceneContext,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::Backend("no compatible GPU adapter".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("driftfall_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::Backend("surface reports no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: display.width.max(1),
            height: display.height.max(1),
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

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        let uniform_layout_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[uniform_layout_entry],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_layout_entry],
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals_buffer"),
            contents: bytemuck::bytes_of(&Globals::from_scene(scene)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            push_constant_ranges: &[],
        });

        // Meshes: opaque, depth-written, both faces so the ground shows from below.
        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::mesh_shader().into()),
        });
        let mesh_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &mesh_shader,
            PipelineParams {
                label: "mesh_pipeline",
                vs_entry: "vs_mesh",
                fs_entry: "fs_mesh",
                buffers: &[Vertex::LAYOUT],
                format: surface_format,
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
            },
        );

        // Particles: alpha-blended sprites that test against depth but never write it.
        let points_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::points_shader().into()),
        });
        let points_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &points_shader,
            PipelineParams {
                label: "points_pipeline",
                vs_entry: "vs_points",
                fs_entry: "fs_points",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (std::mem::size_of::<f32>() * 3) as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
                format: surface_format,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            },
        );

        let meshes = scene
            .meshes()
            .iter()
            .map(|mesh| GpuMesh::upload(&device, &object_layout, mesh))
            .collect();

        let positions = scene.particles.system.positions();
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_instance_buffer"),
            // Never zero-sized; an empty cloud simply skips its draw.
            size: (std::mem::size_of_val(positions) as u64).max(12),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let particle_uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle_uniform_buffer"),
            contents: bytemuck::bytes_of(&PointUniforms::from_scene(scene)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let particle_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particle_bind_group"),
            layout: &object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: particle_uniforms.as_entire_binding(),
            }],
        });
        let particles = GpuParticles {
            instance_buffer,
            uniform_buffer: particle_uniforms,
            bind_group: particle_bind_group,
            count: scene.particles.system.count() as u32,
            uploaded_version: None,
        };

        let depth_texture = create_depth_texture(&device, config.width, config.height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            display,
            mesh_pipeline,
            points_pipeline,
            globals_buffer,
            globals_bind_group,
            meshes,
            particles,
            depth_texture,
        })
    }

    /// Record the size the host currently displays.
    pub fn set_display_size(&mut self, size: Viewport) {
        self.display = size;
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn upload_particles(&mut self, scene: &SceneContext) {
        let system = &scene.particles.system;
        if self.particles.uploaded_version == Some(system.version()) {
            return;
        }
        if !system.is_empty() {
            self.queue.write_buffer(
                &self.particles.instance_buffer,
                0,
                bytemuck::cast_slice(system.positions()),
            );
        }
        self.particles.uploaded_version = Some(system.version());
    }
}

impl RenderSurface for WgpuRenderer {
    fn display_size(&self) -> Viewport {
        self.display
    }

    fn target_size(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    fn set_target_size(&mut self, size: Viewport) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.reconfigure();
        self.depth_texture = create_depth_texture(&self.device, self.config.width, self.config.height);
    }
}

impl Renderer for WgpuRenderer {
    fn render(&mut self, scene: &SceneContext) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface acquire timed out, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Backend(e.to_string())),
        };

        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals::from_scene(scene)),
        );
        for (gpu_mesh, mesh) in self.meshes.iter().zip(scene.meshes()) {
            gpu_mesh.write_uniforms(&self.queue, mesh);
        }
        self.queue.write_buffer(
            &self.particles.uniform_buffer,
            0,
            bytemuck::bytes_of(&PointUniforms::from_scene(scene)),
        );
        self.upload_particles(scene);

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let bg = scene.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.r as f64,
                            g: bg.g as f64,
                            b: bg.b as f64,
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
                ..Default::default()
            });

            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for gpu_mesh in &self.meshes {
                gpu_mesh.draw(&mut pass);
            }

            if self.particles.count > 0 {
                pass.set_pipeline(&self.points_pipeline);
                pass.set_bind_group(0, &self.globals_bind_group, &[]);
                pass.set_bind_group(1, &self.particles.bind_group, &[]);
                pass.set_vertex_buffer(0, self.particles.instance_buffer.slice(..));
                pass.draw(0..6, 0..self.particles.count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

struct PipelineParams<'a> {
    label: &'a str,
    vs_entry: &'a str,
    fs_entry: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    depth_write: bool,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    params: PipelineParams<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(params.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(params.vs_entry),
            compilation_options: Default::default(),
            buffers: params.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(params.fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: params.format,
                blend: Some(params.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: params.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
