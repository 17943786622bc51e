use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::{bytes_of, Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use log::error;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::geometry;
use crate::scene::{DirectionalLight, MaterialClass, Scene, SceneObject, Shape};
use crate::stl::{self, TriMesh};

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

/// Global lighting and atmosphere state, extracted from a scene.
#[derive(Clone, Debug)]
pub struct SceneEnvironment {
    pub background: Vec3,
    pub fog_color: Vec3,
    pub fog_near: f32,
    pub fog_far: f32,
    pub hemi_sky: Vec3,
    pub hemi_ground: Vec3,
    pub hemi_intensity: f32,
    pub lights: [DirectionalLight; 2],
}

impl SceneEnvironment {
    /// The shader supports two directional lights; extra lights are ignored
    /// and missing ones contribute nothing.
    pub fn from_scene(scene: &Scene) -> Self {
        let dark = DirectionalLight {
            position: Vec3::Y,
            color: Vec3::ZERO,
            intensity: 0.0,
        };
        let mut lights = [dark, dark];
        for (slot, light) in lights.iter_mut().zip(scene.directionals.iter()) {
            *slot = *light;
        }
        Self {
            background: scene.background,
            fog_color: scene.fog.color,
            fog_near: scene.fog.near,
            fog_far: scene.fog.far,
            hemi_sky: scene.hemisphere.sky,
            hemi_ground: scene.hemisphere.ground,
            hemi_intensity: scene.hemisphere.intensity,
            lights,
        }
    }
}

/// GPU renderer backed by wgpu that draws the objects in the data model.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: DepthBuffer,
    pipeline: wgpu::RenderPipeline,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    mesh_cache: HashMap<String, MeshBuffers>,
    missing_meshes: HashSet<String>,
    clear_color: Vec3,
}

impl Renderer {
    /// Initializes the GPU renderer for the provided window.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = unsafe { instance.create_surface(window.as_ref()) }
            .context("failed to create rendering surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("renderer-device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| {
                    matches!(
                        mode,
                        wgpu::PresentMode::Mailbox | wgpu::PresentMode::Immediate
                    )
                })
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("renderer-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("global-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<GlobalUniform>() as u64)
                            .unwrap(),
                    ),
                },
                count: None,
            }],
        });

        // Per-object uniform layout
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<ObjectConstants>() as u64)
                            .unwrap(),
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("renderer-pipeline-layout"),
            bind_group_layouts: &[&global_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("global-uniform"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("global-bind-group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("renderer-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (6 * std::mem::size_of::<f32>()) as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: (3 * std::mem::size_of::<f32>()) as u64,
                            shader_location: 1,
                        },
                    ],
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth,
            pipeline,
            global_buffer,
            global_bind_group,
            object_layout,
            mesh_cache: HashMap::new(),
            missing_meshes: HashSet::new(),
            clear_color: Vec3::ZERO,
        })
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Exposes the inner window for event handling.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Registers a mesh that was already parsed elsewhere (the board load
    /// completion), so the draw path never re-reads the asset.
    pub fn install_mesh(&mut self, asset: &str, mesh: &TriMesh) {
        let key = shape_key(&Shape::Mesh {
            asset: asset.to_string(),
        });
        self.mesh_cache
            .insert(key, MeshBuffers::from_mesh(&self.device, mesh, asset));
    }

    /// Updates the camera, lighting and atmosphere uniforms before rendering.
    pub fn update_globals(&mut self, camera: &CameraParams, environment: &SceneEnvironment) {
        self.clear_color = environment.background;
        let uniform = GlobalUniform {
            view_proj: camera.view_proj.to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).into(),
            fog_color_near: environment.fog_color.extend(environment.fog_near).into(),
            fog_far_hemi: [
                environment.fog_far,
                environment.hemi_intensity,
                0.0,
                0.0,
            ],
            hemi_sky: environment.hemi_sky.extend(1.0).into(),
            hemi_ground: environment.hemi_ground.extend(1.0).into(),
            light0_position: environment.lights[0].position.extend(1.0).into(),
            light0_color: environment.lights[0]
                .color
                .extend(environment.lights[0].intensity)
                .into(),
            light1_position: environment.lights[1].position.extend(1.0).into(),
            light1_color: environment.lights[1]
                .color
                .extend(environment.lights[1].intensity)
                .into(),
        };
        self.queue
            .write_buffer(&self.global_buffer, 0, bytes_of(&uniform));
    }

    /// Draws the provided scene snapshot. Translucent objects are drawn last
    /// so they blend over the rest of the scene.
    pub fn render(&mut self, objects: &[SceneObject]) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer-encoder"),
            });

        // Build the draw list and ensure shape buffers exist, opaque first.
        let mut draw_list: Vec<(String, usize)> = Vec::new();
        for translucent_pass in [false, true] {
            for (index, object) in objects.iter().enumerate() {
                let translucent = object.material == MaterialClass::Translucent;
                if translucent != translucent_pass {
                    continue;
                }
                self.ensure_shape_loaded(&object.shape);
                let key = shape_key(&object.shape);
                if self.mesh_cache.contains_key(&key) {
                    draw_list.push((key, index));
                }
            }
        }

        let mut bind_groups = Vec::new();
        for (_, index) in &draw_list {
            let object = &objects[*index];
            let model = object_model_matrix(object);
            let normal = Mat3::from_mat4(model).inverse().transpose();
            let constants = ObjectConstants {
                model: model.to_cols_array_2d(),
                normal: mat3_to_3x4(normal),
                color: object.color.extend(1.0).into(),
                params: [
                    material_mode(object.material) as f32,
                    material_opacity(object.material),
                    0.0,
                    0.0,
                ],
            };

            let object_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("object-uniform"),
                    contents: bytes_of(&constants),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });

            let object_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &self.object_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: object_buffer.as_entire_binding(),
                }],
                label: Some("object-bind-group"),
            });

            bind_groups.push(object_bind_group);
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("main-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(self.clear_color.x),
                        g: f64::from(self.clear_color.y),
                        b: f64::from(self.clear_color.z),
                        a: 1.0,
                    }),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.global_bind_group, &[]);

        for ((key, _), bind_group) in draw_list.iter().zip(bind_groups.iter()) {
            let mesh = &self.mesh_cache[key];
            pass.set_vertex_buffer(0, mesh.vertex.slice(..));
            pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
            pass.set_bind_group(1, bind_group, &[]);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        drop(pass); // explicit to satisfy lifetimes on some backends
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn ensure_shape_loaded(&mut self, shape: &Shape) {
        let key = shape_key(shape);
        if self.mesh_cache.contains_key(&key) || self.missing_meshes.contains(&key) {
            return;
        }
        let mesh = match shape {
            Shape::Box { size } => geometry::box_mesh(*size),
            Shape::Sphere { radius } => geometry::sphere_mesh(*radius, 16, 12),
            Shape::Mesh { asset } => match stl::load_stl_file(asset) {
                Ok(mesh) => mesh,
                Err(err) => {
                    error!("failed to load mesh {asset}: {err:?}");
                    self.missing_meshes.insert(key);
                    return;
                }
            },
        };
        self.mesh_cache
            .insert(key.clone(), MeshBuffers::from_mesh(&self.device, &mesh, &key));
    }
}

/// Cache key for a shape's GPU buffers. Spheres of the same radius and boxes
/// of the same size share buffers.
fn shape_key(shape: &Shape) -> String {
    match shape {
        Shape::Box { size } => format!("box:{}:{}:{}", size.x, size.y, size.z),
        Shape::Sphere { radius } => format!("sphere:{radius}"),
        Shape::Mesh { asset } => format!("mesh:{asset}"),
    }
}

fn material_mode(material: MaterialClass) -> u32 {
    match material {
        MaterialClass::Matte => 0,
        MaterialClass::Glossy => 1,
        MaterialClass::Translucent => 2,
        MaterialClass::NormalShaded => 3,
    }
}

fn material_opacity(material: MaterialClass) -> f32 {
    match material {
        MaterialClass::Translucent => 0.4,
        _ => 1.0,
    }
}

fn object_model_matrix(object: &SceneObject) -> Mat4 {
    let translation = Mat4::from_translation(object.position);
    let rotation = Mat4::from_rotation_z(object.rotation.z.to_radians())
        * Mat4::from_rotation_y(object.rotation.y.to_radians())
        * Mat4::from_rotation_x(object.rotation.x.to_radians());
    let scale = Mat4::from_scale(object.scale);
    translation * rotation * scale
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: &TriMesh, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GlobalUniform {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    fog_color_near: [f32; 4],
    fog_far_hemi: [f32; 4],
    hemi_sky: [f32; 4],
    hemi_ground: [f32; 4],
    light0_position: [f32; 4],
    light0_color: [f32; 4],
    light1_position: [f32; 4],
    light1_color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectConstants {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
    color: [f32; 4],
    /// x = material mode, y = opacity.
    params: [f32; 4],
}

const SHADER: &str = r#"
struct GlobalUniform {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    fog_color_near: vec4<f32>,
    fog_far_hemi: vec4<f32>,
    hemi_sky: vec4<f32>,
    hemi_ground: vec4<f32>,
    light0_position: vec4<f32>,
    light0_color: vec4<f32>,
    light1_position: vec4<f32>,
    light1_color: vec4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    params: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;

    let world_normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;

    out.normal = normalize(world_normal);
    return out;
}

fn directional(normal: vec3<f32>, view_dir: vec3<f32>, position: vec4<f32>, color: vec4<f32>, specular: f32) -> vec3<f32> {
    let light_dir = normalize(position.xyz);
    let diffuse = max(dot(normal, light_dir), 0.0);
    var contribution = diffuse * color.rgb * color.w;
    if (specular > 0.0 && diffuse > 0.0) {
        let half_dir = normalize(light_dir + view_dir);
        contribution = contribution + pow(max(dot(normal, half_dir), 0.0), 64.0) * specular * color.rgb;
    }
    return contribution;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    let mode = u32(object.params.x);
    let opacity = object.params.y;

    var lit: vec3<f32>;
    if (mode == 3u) {
        // normal-shaded: colored by surface orientation, unlit
        lit = normal * 0.5 + vec3<f32>(0.5);
    } else {
        let view_dir = normalize(globals.camera_position.xyz - input.world_pos);
        let hemi_mix = normal.y * 0.5 + 0.5;
        let hemi = mix(globals.hemi_ground.rgb, globals.hemi_sky.rgb, hemi_mix)
            * globals.fog_far_hemi.y * 0.1;
        var specular = 0.0;
        if (mode == 1u) {
            specular = 0.5;
        }
        let direct = directional(normal, view_dir, globals.light0_position, globals.light0_color, specular)
            + directional(normal, view_dir, globals.light1_position, globals.light1_color, specular);
        lit = (hemi + direct * 0.3) * object.color.rgb;
    }

    let distance = length(globals.camera_position.xyz - input.world_pos);
    let fog_near = globals.fog_color_near.w;
    let fog_far = globals.fog_far_hemi.x;
    let fog = clamp((fog_far - distance) / max(fog_far - fog_near, 0.001), 0.0, 1.0);
    let final_color = mix(globals.fog_color_near.rgb, lit, fog);

    return vec4<f32>(final_color, opacity);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MaterialClass, SceneObject, Shape};

    #[test]
    fn shape_keys_distinguish_geometry() {
        let a = shape_key(&Shape::Sphere { radius: 0.0078 });
        let b = shape_key(&Shape::Sphere { radius: 0.01 });
        let c = shape_key(&Shape::Box { size: Vec3::ONE });
        assert_ne!(a, b);
        assert_ne!(a, c);
        // every ball shares one cache entry
        assert_eq!(a, shape_key(&Shape::Sphere { radius: 0.0078 }));
    }

    #[test]
    fn translucent_objects_render_with_reduced_opacity() {
        assert_eq!(material_opacity(MaterialClass::Translucent), 0.4);
        assert_eq!(material_opacity(MaterialClass::Matte), 1.0);
    }

    #[test]
    fn model_matrix_applies_translation_last() {
        let object = SceneObject::new(
            "cover",
            Shape::Box { size: Vec3::ONE },
            MaterialClass::Translucent,
        )
        .at(Vec3::new(0.0, 0.19, 0.111));
        let matrix = object_model_matrix(&object);
        let origin = matrix.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.19, 0.111)).length() < 1e-6);
    }

    #[test]
    fn environment_pads_missing_lights() {
        let mut scene = crate::scene::showcase_scene();
        scene.directionals.truncate(1);
        let environment = SceneEnvironment::from_scene(&scene);
        assert_eq!(environment.lights[1].intensity, 0.0);
    }
}
