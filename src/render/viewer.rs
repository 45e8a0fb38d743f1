//! wgpu presentation layer.
//!
//! The viewer owns no animation state: every frame it ticks the [`Slider`],
//! receives a plain-data snapshot and applies it to one of two pipelines (a
//! transformed-quad scene pipeline for cube/cascade/crossfade, a fullscreen
//! pass for glitch).

use std::{sync::Arc, time::Instant};

use anyhow::{Context, Result, anyhow};
use tracing::info;
use wgpu::util::DeviceExt;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

use crate::engine::{
    Axis, CascadeSnapshot, CrossfadeSnapshot, CubeSnapshot, FrameClock, GlitchSnapshot, Slider,
    Snapshot,
};
use crate::layout::{CoverFit, cover_fit};
use crate::render::math::{self, Mat4};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

const QUAD: [Vertex; 4] = [
    //   NDC pos         UV
    Vertex {
        pos: [-1.0, -1.0],
        uv: [0.0, 1.0],
    }, // bottom-left
    Vertex {
        pos: [1.0, -1.0],
        uv: [1.0, 1.0],
    }, // bottom-right
    Vertex {
        pos: [-1.0, 1.0],
        uv: [0.0, 0.0],
    }, // top-left
    Vertex {
        pos: [1.0, 1.0],
        uv: [1.0, 0.0],
    }, // top-right
];

/// Per-draw uniform block for the scene pipeline (96 bytes in WGSL).
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadParams {
    mvp: [f32; 16],
    uv_scale: [f32; 2],
    uv_offset: [f32; 2],
    tint: [f32; 4],
}

/// Uniform block for the glitch pass (64 bytes, mirrors `GlitchParams` in
/// glitch.wgsl).
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GlitchParams {
    uv_scale: [f32; 2],
    uv_offset: [f32; 2],
    aberration: f32,
    scanline: f32,
    grain: f32,
    time: f32,
    layer0_offset: [f32; 2],
    layer1_offset: [f32; 2],
    layer0_hue: f32,
    layer1_hue: f32,
    strength: f32,
    _pad: f32,
}

/// Dynamic-offset stride; `QuadParams` padded up to the default
/// `min_uniform_buffer_offset_alignment`.
const QUAD_STRIDE: u64 = 256;

/// Camera distance from the cube center. The front face (at z = 0.5) fills
/// the viewport exactly when the vertical FOV is `2 * atan(0.5 / (d - 0.5))`.
const CAM_DIST: f32 = 1.5;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Run the slideshow window over a configured slider.
///
/// # Errors
/// Returns [`crate::error::Error::Render`] when no GPU is available (the
/// crossfade fallback needs an embedding host with its own 2D presentation)
/// or when the event loop fails to start.
pub fn run_slider(mut slider: Slider) -> Result<(), crate::error::Error> {
    if !crate::capability::gpu_available() {
        // Flush the one-shot notification before giving up.
        let _ = slider.advance(0.0);
        return Err(crate::error::Error::Render(anyhow!(
            "no compatible GPU adapter; cannot present the slideshow window"
        )));
    }
    info!(
        slides = slider.slide_count(),
        style = %slider.config().style,
        "starting slideshow"
    );
    let run = move || -> Result<()> {
        let event_loop = EventLoop::new().context("creating event loop")?;
        let mut app = App::new(slider);
        event_loop.run_app(&mut app).context("running event loop")?;
        Ok(())
    };
    run().map_err(crate::error::Error::Render)
}

struct Tex {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    scene_pipeline: wgpu::RenderPipeline,
    glitch_pipeline: wgpu::RenderPipeline,
    tex_layout: wgpu::BindGroupLayout,
    vbuf: wgpu::Buffer,
    sampler: wgpu::Sampler,
    depth_view: wgpu::TextureView,

    quad_buf: wgpu::Buffer,
    quad_bind_group: wgpu::BindGroup,
    quad_capacity: u64,
    glitch_buf: wgpu::Buffer,
    glitch_bind_group: wgpu::BindGroup,

    textures: Vec<Tex>,
}

struct App {
    slider: Slider,
    clock: FrameClock,
    auto_timer: Instant,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    uploaded: bool,
    cover_uvs: Vec<CoverFit>,
}

impl App {
    fn new(slider: Slider) -> Self {
        Self {
            slider,
            clock: FrameClock::new(),
            auto_timer: Instant::now(),
            window: None,
            gpu: None,
            uploaded: false,
            cover_uvs: Vec::new(),
        }
    }
}

impl ApplicationHandler for App {
    #[allow(clippy::too_many_lines)]
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attrs = WindowAttributes::default().with_title("slider3d");
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));
        let monitor = window.current_monitor();
        window.set_fullscreen(Some(Fullscreen::Borderless(monitor)));
        window.set_cursor_visible(false);
        self.window = Some(window.clone());

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let quad_capacity = self.quad_capacity();

        let gpu_init = async move {
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .context("no compatible GPU adapter found")?;

            let (device, queue) = adapter
                .request_device(
                    &wgpu::DeviceDescriptor {
                        label: Some("device"),
                        required_features: wgpu::Features::empty(),
                        required_limits: wgpu::Limits::default(),
                    },
                    None,
                )
                .await?;

            let caps = surface.get_capabilities(&adapter);
            let format = caps
                .formats
                .iter()
                .copied()
                .find(wgpu::TextureFormat::is_srgb)
                .unwrap_or(caps.formats[0]);
            let PhysicalSize { width, height } = window.inner_size();
            let config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: width.max(1),
                height: height.max(1),
                present_mode: wgpu::PresentMode::AutoVsync,
                alpha_mode: caps.alpha_modes[0],
                view_formats: vec![],
                desired_maximum_frame_latency: 1,
            };
            surface.configure(&device, &config);

            let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            });

            let tex_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tex_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
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

            let quad_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("quad_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

            let glitch_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("glitch_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

            let quad_buf = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("quad_params"),
                size: quad_capacity * QUAD_STRIDE,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let quad_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("quad_bind_group"),
                layout: &quad_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &quad_buf,
                        offset: 0,
                        size: wgpu::BufferSize::new(std::mem::size_of::<QuadParams>() as u64),
                    }),
                }],
            });

            let glitch_buf = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("glitch_params"),
                size: std::mem::size_of::<GlitchParams>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let glitch_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("glitch_bind_group"),
                layout: &glitch_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: glitch_buf.as_entire_binding(),
                }],
            });

            let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad"),
                contents: bytemuck::cast_slice(&QUAD),
                usage: wgpu::BufferUsages::VERTEX,
            });

            let vlayout = wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
            };

            let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("scene_shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
            });
            let glitch_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("glitch_shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/glitch.wgsl").into()),
            });

            let scene_pip_layout =
                device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("scene_pipe_layout"),
                    bind_group_layouts: &[&tex_layout, &quad_layout],
                    push_constant_ranges: &[],
                });
            let scene_pipeline =
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("scene_pipeline"),
                    layout: Some(&scene_pip_layout),
                    vertex: wgpu::VertexState {
                        module: &scene_shader,
                        entry_point: "vs_main",
                        buffers: &[vlayout.clone()],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &scene_shader,
                        entry_point: "fs_main",
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleStrip,
                        strip_index_format: None,
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::LessEqual,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                });

            let glitch_pip_layout =
                device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("glitch_pipe_layout"),
                    bind_group_layouts: &[&tex_layout, &glitch_layout],
                    push_constant_ranges: &[],
                });
            let glitch_pipeline =
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("glitch_pipeline"),
                    layout: Some(&glitch_pip_layout),
                    vertex: wgpu::VertexState {
                        module: &glitch_shader,
                        entry_point: "vs_main",
                        buffers: &[vlayout],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &glitch_shader,
                        entry_point: "fs_main",
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleStrip,
                        strip_index_format: None,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                });

            let depth_view = create_depth(&device, &config);

            Ok::<Gpu, anyhow::Error>(Gpu {
                surface,
                device,
                queue,
                config,
                scene_pipeline,
                glitch_pipeline,
                tex_layout,
                vbuf,
                sampler,
                depth_view,
                quad_buf,
                quad_bind_group,
                quad_capacity,
                glitch_buf,
                glitch_bind_group,
                textures: Vec::new(),
            })
        };

        self.gpu = Some(pollster::block_on(gpu_init).expect("GPU init"));
        self.clock.reset();
        self.auto_timer = Instant::now();
    }

    fn window_event(&mut self, el: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(win) = &self.window else { return };
        if win.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => el.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Released {
                    use winit::keyboard::{KeyCode, PhysicalKey};
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape | KeyCode::KeyQ) => el.exit(),
                        PhysicalKey::Code(KeyCode::ArrowRight | KeyCode::Space) => {
                            self.slider.next();
                        }
                        PhysicalKey::Code(KeyCode::ArrowLeft) => self.slider.prev(),
                        PhysicalKey::Code(KeyCode::Home) => self.slider.go_to(0),
                        _ => {}
                    }
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(gpu) = &mut self.gpu
                    && width > 0
                    && height > 0
                {
                    gpu.config.width = width;
                    gpu.config.height = height;
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.depth_view = create_depth(&gpu.device, &gpu.config);
                }
            }
            WindowEvent::RedrawRequested => self.frame(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _el: &ActiveEventLoop) {
        if let Some(win) = &self.window {
            win.request_redraw();
        }
    }
}

impl App {
    fn quad_capacity(&self) -> u64 {
        let cfg = self.slider.config();
        let (rows, cols) = crate::engine::grid_size(cfg.min_tiles, cfg.aspect_ratio);
        let tiles = u64::from(rows) * u64::from(cols) * 2;
        let slides = self.slider.slide_count() as u64;
        64u64.max(tiles + 4).max(slides + 4)
    }

    fn upload_slide_textures(&mut self) {
        let Some(gpu) = &mut self.gpu else { return };
        let Some(resources) = self.slider.resources() else {
            return;
        };
        let target_aspect = self.slider.config().aspect_ratio;
        self.cover_uvs = resources
            .aspects()
            .into_iter()
            .map(|aspect| cover_fit(aspect, target_aspect))
            .collect();
        gpu.textures = resources
            .iter()
            .map(|res| {
                upload_texture(
                    &gpu.device,
                    &gpu.queue,
                    &gpu.tex_layout,
                    &gpu.sampler,
                    &res.pixels,
                    res.width,
                    res.height,
                )
            })
            .collect();
        info!(textures = gpu.textures.len(), "slide textures uploaded");
    }

    fn frame(&mut self) {
        if self.gpu.is_none() {
            return;
        }
        if !self.uploaded && self.slider.resources().is_some() {
            self.upload_slide_textures();
            self.uploaded = true;
            self.clock.reset();
        }

        let auto_play = self.slider.config().auto_play;
        let auto_play_interval = self.slider.config().auto_play_interval;
        if auto_play
            && self.uploaded
            && !self.slider.is_animating()
            && self.auto_timer.elapsed() >= auto_play_interval
        {
            self.slider.next();
            self.auto_timer = Instant::now();
        }

        let dt = self.clock.tick();
        let snapshot = self.slider.advance(dt);
        self.draw(&snapshot);
    }

    fn draw(&mut self, snapshot: &Snapshot) {
        let Some(gpu) = &mut self.gpu else { return };
        let Ok(frame) = gpu.surface.get_current_texture() else {
            return;
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        match snapshot {
            Snapshot::Loading => {
                clear_pass(&mut encoder, &view);
            }
            Snapshot::Glitch(gs) => draw_glitch(gpu, &mut encoder, &view, gs),
            Snapshot::Cube(cs) => {
                let quads = cube_quads(cs);
                draw_scene(gpu, &mut encoder, &view, &quads);
            }
            Snapshot::Cascade(cs) => {
                let quads = cascade_quads(cs);
                draw_scene(gpu, &mut encoder, &view, &quads);
            }
            Snapshot::Crossfade(cf) => {
                let quads = crossfade_quads(cf, &self.cover_uvs);
                draw_scene(gpu, &mut encoder, &view, &quads);
            }
        }

        gpu.queue.submit([encoder.finish()]);
        frame.present();
    }
}

struct QuadDraw {
    texture: usize,
    params: QuadParams,
}

fn quad_params(mvp: Mat4, uv: CoverFit, alpha: f32) -> QuadParams {
    QuadParams {
        mvp,
        uv_scale: [uv.scale_u, uv.scale_v],
        uv_offset: [uv.offset_u, uv.offset_v],
        tint: [1.0, 1.0, 1.0, alpha],
    }
}

/// Projection * view placing the front cube face (z = 0.5) exactly across
/// the viewport.
fn view_proj() -> Mat4 {
    let fovy = 2.0 * (0.5 / (CAM_DIST - 0.5)).atan();
    math::mul(
        &math::perspective(fovy, 1.0, 0.1, 10.0),
        &math::translate(0.0, 0.0, -CAM_DIST),
    )
}

fn axis_rotation(axis: Axis, degrees: f32) -> Mat4 {
    match axis {
        Axis::Y => math::rotate_y(degrees),
        Axis::X => math::rotate_x(degrees),
    }
}

fn cube_quads(cs: &CubeSnapshot) -> Vec<QuadDraw> {
    let vp = view_proj();
    // Vertex quad spans [-1, 1]; halve it to a unit face on the cube front.
    let face_local = math::mul(
        &math::translate(0.0, 0.0, 0.5),
        &math::scale(0.5, 0.5, 1.0),
    );
    let pivot = axis_rotation(cs.axis, cs.angle_deg);

    let mut quads = Vec::with_capacity(2);
    if let Some(incoming) = &cs.incoming {
        let placement = math::mul(&axis_rotation(cs.axis, cs.incoming_offset_deg), &face_local);
        let model = math::mul(&pivot, &placement);
        quads.push(QuadDraw {
            texture: incoming.texture,
            params: quad_params(math::mul(&vp, &model), incoming.uv, 1.0),
        });
    }
    let model = math::mul(&pivot, &face_local);
    quads.push(QuadDraw {
        texture: cs.front.texture,
        params: quad_params(math::mul(&vp, &model), cs.front.uv, 1.0),
    });
    quads
}

/// Sub-rectangle of a cover-fit crop for one grid tile.
fn tile_uv(full: CoverFit, row: u32, col: u32, rows: u32, cols: u32) -> CoverFit {
    #[allow(clippy::cast_precision_loss)]
    let (rows_f, cols_f) = (rows as f32, cols as f32);
    #[allow(clippy::cast_precision_loss)]
    let (row_f, col_f) = (row as f32, col as f32);
    let (offset_u, offset_v) = full.apply(col_f / cols_f, row_f / rows_f);
    CoverFit {
        scale_u: full.scale_u / cols_f,
        scale_v: full.scale_v / rows_f,
        offset_u,
        offset_v,
    }
}

#[allow(clippy::cast_precision_loss)]
fn cascade_quads(cs: &CascadeSnapshot) -> Vec<QuadDraw> {
    let vp = view_proj();
    let (rows, cols) = (cs.rows, cs.cols);
    let w = 1.0 / cols as f32;
    let h = 1.0 / rows as f32;
    let mut quads = Vec::with_capacity((rows * cols * 2) as usize);

    for row in 0..rows {
        for col in 0..cols {
            let angle = cs.angles[(row * cs.cols + col) as usize];
            let cx = -0.5 + (col as f32 + 0.5) * w;
            let cy = 0.5 - (row as f32 + 0.5) * h;
            // Rotate about the tile's left vertical edge. The grid sits on
            // the z = 0.5 plane, same as the cube front face, so the flat
            // grid spans the full viewport.
            let hinge = |theta: f32| {
                math::mul(
                    &math::translate(cx - w / 2.0, cy, 0.5),
                    &math::mul(
                        &math::rotate_y(theta),
                        &math::mul(
                            &math::translate(w / 2.0, 0.0, 0.0),
                            &math::scale(w / 2.0, h / 2.0, 1.0),
                        ),
                    ),
                )
            };

            if let Some(back) = cs.back_texture {
                let model = hinge(angle - cs.rotation_sign * 90.0);
                quads.push(QuadDraw {
                    texture: back,
                    params: quad_params(
                        math::mul(&vp, &model),
                        tile_uv(cs.back_uv, row, col, rows, cols),
                        1.0,
                    ),
                });
            }
            let model = hinge(angle);
            quads.push(QuadDraw {
                texture: cs.front_texture,
                params: quad_params(
                    math::mul(&vp, &model),
                    tile_uv(cs.front_uv, row, col, rows, cols),
                    1.0,
                ),
            });
        }
    }
    quads
}

fn crossfade_quads(cf: &CrossfadeSnapshot, cover_uvs: &[CoverFit]) -> Vec<QuadDraw> {
    cf.opacities
        .iter()
        .enumerate()
        .filter(|(_, alpha)| **alpha > 0.0)
        .map(|(texture, alpha)| {
            let uv = cover_uvs.get(texture).copied().unwrap_or(CoverFit::IDENTITY);
            QuadDraw {
                texture,
                params: quad_params(math::identity(), uv, *alpha),
            }
        })
        .collect()
}

fn clear_pass(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("clear"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
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
}

fn draw_scene(
    gpu: &Gpu,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    quads: &[QuadDraw],
) {
    let count = (quads.len() as u64).min(gpu.quad_capacity);
    for (i, quad) in quads.iter().take(count as usize).enumerate() {
        gpu.queue.write_buffer(
            &gpu.quad_buf,
            i as u64 * QUAD_STRIDE,
            bytemuck::bytes_of(&quad.params),
        );
    }

    let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("scene"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &gpu.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Discard,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    rpass.set_pipeline(&gpu.scene_pipeline);
    rpass.set_vertex_buffer(0, gpu.vbuf.slice(..));
    for (i, quad) in quads.iter().take(count as usize).enumerate() {
        let Some(tex) = gpu.textures.get(quad.texture) else {
            continue;
        };
        #[allow(clippy::cast_possible_truncation)]
        let offset = (i as u64 * QUAD_STRIDE) as u32;
        rpass.set_bind_group(0, &tex.bind_group, &[]);
        rpass.set_bind_group(1, &gpu.quad_bind_group, &[offset]);
        rpass.draw(0..4, 0..1);
    }
}

fn draw_glitch(
    gpu: &Gpu,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    gs: &GlitchSnapshot,
) {
    let params = GlitchParams {
        uv_scale: [gs.uv.scale_u, gs.uv.scale_v],
        uv_offset: [gs.uv.offset_u, gs.uv.offset_v],
        aberration: gs.aberration,
        scanline: gs.scanline,
        grain: gs.grain,
        time: gs.time,
        layer0_offset: gs.layers[0].uv_offset,
        layer1_offset: gs.layers[1].uv_offset,
        layer0_hue: gs.layers[0].hue,
        layer1_hue: gs.layers[1].hue,
        strength: gs.layer_strength,
        _pad: 0.0,
    };
    gpu.queue
        .write_buffer(&gpu.glitch_buf, 0, bytemuck::bytes_of(&params));

    let Some(tex) = gpu.textures.get(gs.texture) else {
        clear_pass(encoder, view);
        return;
    };
    let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("glitch"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
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
    rpass.set_pipeline(&gpu.glitch_pipeline);
    rpass.set_vertex_buffer(0, gpu.vbuf.slice(..));
    rpass.set_bind_group(0, &tex.bind_group, &[]);
    rpass.set_bind_group(1, &gpu.glitch_bind_group, &[]);
    rpass.draw(0..4, 0..1);
}

fn create_depth(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
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
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    pixels: &[u8],
    w: u32,
    h: u32,
) -> Tex {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("slide"),
        size: wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        texture.as_image_copy(),
        pixels,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * w),
            rows_per_image: Some(h),
        },
        wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("slide_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    Tex {
        _texture: texture,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run a local-space point through an mvp and the perspective divide.
    fn project(m: &Mat4, x: f32, y: f32, z: f32) -> (f32, f32) {
        let cx = m[0] * x + m[4] * y + m[8] * z + m[12];
        let cy = m[1] * x + m[5] * y + m[9] * z + m[13];
        let cw = m[3] * x + m[7] * y + m[11] * z + m[15];
        (cx / cw, cy / cw)
    }

    #[test]
    fn cube_front_face_fills_the_viewport_at_rest() {
        let cs = CubeSnapshot {
            axis: Axis::Y,
            angle_deg: 0.0,
            incoming_offset_deg: 0.0,
            front: crate::engine::cube::FaceQuad {
                texture: 0,
                uv: CoverFit::IDENTITY,
            },
            incoming: None,
        };
        let quads = cube_quads(&cs);
        assert_eq!(quads.len(), 1);
        // Face corner (1, 1) lands exactly on the NDC corner.
        let (x, y) = project(&quads[0].params.mvp, 1.0, 1.0, 0.0);
        assert!((x - 1.0).abs() < 1e-5, "face edge at NDC {x}");
        assert!((y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn flat_cascade_grid_fills_the_viewport() {
        // The grid sits on the cube-face plane, so at rest the outer tile
        // corners project to NDC +-1 with no letterbox border.
        let cs = CascadeSnapshot {
            rows: 2,
            cols: 2,
            angles: vec![0.0; 4],
            rotation_sign: 0.0,
            front_texture: 0,
            back_texture: None,
            front_uv: CoverFit::IDENTITY,
            back_uv: CoverFit::IDENTITY,
        };
        let quads = cascade_quads(&cs);
        assert_eq!(quads.len(), 4);

        // Top-left tile, local corner (-1, 1).
        let (x, y) = project(&quads[0].params.mvp, -1.0, 1.0, 0.0);
        assert!((x - -1.0).abs() < 1e-5, "grid edge at NDC {x}");
        assert!((y - 1.0).abs() < 1e-5);
        // Bottom-right tile, local corner (1, -1).
        let (x, y) = project(&quads[3].params.mvp, 1.0, -1.0, 0.0);
        assert!((x - 1.0).abs() < 1e-5);
        assert!((y - -1.0).abs() < 1e-5);
    }

    #[test]
    fn cascade_grid_plane_matches_the_cube_face() {
        let cube = CubeSnapshot {
            axis: Axis::Y,
            angle_deg: 0.0,
            incoming_offset_deg: 0.0,
            front: crate::engine::cube::FaceQuad {
                texture: 0,
                uv: CoverFit::IDENTITY,
            },
            incoming: None,
        };
        let cascade = CascadeSnapshot {
            rows: 2,
            cols: 2,
            angles: vec![0.0; 4],
            rotation_sign: 0.0,
            front_texture: 0,
            back_texture: None,
            front_uv: CoverFit::IDENTITY,
            back_uv: CoverFit::IDENTITY,
        };
        let face = project(&cube_quads(&cube)[0].params.mvp, -1.0, 1.0, 0.0);
        let grid = project(&cascade_quads(&cascade)[0].params.mvp, -1.0, 1.0, 0.0);
        assert!((face.0 - grid.0).abs() < 1e-5);
        assert!((face.1 - grid.1).abs() < 1e-5);
    }

    #[test]
    fn tile_uv_partitions_the_cover_crop() {
        // 2:1 source on a square target: visible U range [0.25, 0.75].
        let full = crate::layout::cover_fit(2.0, 1.0);
        let tl = tile_uv(full, 0, 0, 2, 2);
        assert!((tl.offset_u - 0.25).abs() < 1e-6);
        assert!((tl.scale_u - 0.25).abs() < 1e-6);
        let br = tile_uv(full, 1, 1, 2, 2);
        assert!((br.offset_u - 0.5).abs() < 1e-6);
        assert!((br.offset_v - 0.5).abs() < 1e-6);
        // The last tile's crop ends exactly at the full crop's edge.
        assert!((br.offset_u + br.scale_u - 0.75).abs() < 1e-6);
        assert!((br.offset_v + br.scale_v - 1.0).abs() < 1e-6);
    }
}
