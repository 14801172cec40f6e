use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, anyhow};
use arena_math::{Vec3, radians};
use arena_render::{Camera, Ray};
use arena_render_wgpu::{
    Programs, TextureOptions, WgpuDevice, WgpuFrame, create_depth_view, load_texture_from_memory,
};
use arena_scene::{Arena, ArenaConfig, BALL_SKINS, TextureSources};
use clap::Parser;
use egui::Context as EguiContext;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Camera travel per second while an arrow or page key is held.
const MOVE_SPEED: f32 = 10.0;
/// Camera turn per second, in degrees.
const TURN_SPEED: f32 = 45.0;

const SKIN_NAMES: [&str; BALL_SKINS] = ["Awesome", "Shocked", "Incredulous"];

#[derive(Parser)]
#[command(name = "arena-desktop", about = "Instanced arena viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Arena config file (JSON); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Application state.
struct AppState {
    config: ArenaConfig,
    camera: Camera,
    arena: Option<Arena<WgpuDevice>>,
    half_fov_degrees: f32,
    grid_color: [f32; 4],
    background: [f32; 4],
    show_panel: bool,
    last_ray: Option<Ray>,
    // Input state
    keys_held: HashSet<KeyCode>,
    cursor: PhysicalPosition<f64>,
    started: Instant,
    last_frame: Instant,
}

impl AppState {
    fn new(config: ArenaConfig) -> Self {
        let camera = Camera::new(config.camera.to_desc(1280, 720));
        Self {
            half_fov_degrees: config.camera.half_fov_degrees,
            grid_color: config.grid.color,
            background: config.background,
            camera,
            config,
            arena: None,
            show_panel: true,
            last_ray: None,
            keys_held: HashSet::new(),
            cursor: PhysicalPosition::new(0.0, 0.0),
            started: Instant::now(),
            last_frame: Instant::now(),
        }
    }

    fn update(&mut self, dt: f32) {
        let held = |key| self.keys_held.contains(&key);
        let axis = |neg, pos| match (held(neg), held(pos)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };

        let step = MOVE_SPEED * dt;
        let motion = Vec3::new(
            axis(KeyCode::ArrowLeft, KeyCode::ArrowRight),
            axis(KeyCode::ArrowUp, KeyCode::ArrowDown),
            axis(KeyCode::PageDown, KeyCode::PageUp),
        ) * step;
        if motion != Vec3::ZERO {
            let position = self.camera.position();
            self.camera.set_position(position + motion);
        }

        let turn = radians(TURN_SPEED * dt);
        let (yaw, pitch, roll) = (
            axis(KeyCode::KeyQ, KeyCode::KeyE),
            axis(KeyCode::KeyF, KeyCode::KeyR),
            axis(KeyCode::KeyZ, KeyCode::KeyC),
        );
        let orientation = self.camera.orientation();
        if yaw != 0.0 {
            self.camera.set_scene_yaw(orientation.yaw + yaw * turn);
        }
        if pitch != 0.0 {
            self.camera.set_scene_pitch(orientation.pitch + pitch * turn);
        }
        if roll != 0.0 {
            self.camera.set_scene_roll(orientation.roll + roll * turn);
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }

        if !pressed {
            return;
        }

        match key {
            KeyCode::Backspace => self.reset_camera(),
            KeyCode::Digit1 | KeyCode::Digit2 | KeyCode::Digit3 => {
                let skin = match key {
                    KeyCode::Digit1 => 0,
                    KeyCode::Digit2 => 1,
                    _ => 2,
                };
                if let Some(arena) = &mut self.arena {
                    arena.set_skin(skin);
                    tracing::info!("ball skin: {}", SKIN_NAMES[skin]);
                }
            }
            KeyCode::KeyG => {
                if let Some(arena) = &mut self.arena {
                    arena.set_grid_visible(!arena.grid_visible());
                }
            }
            KeyCode::F1 => {
                self.show_panel = !self.show_panel;
            }
            _ => {}
        }
    }

    fn reset_camera(&mut self) {
        self.camera.reset_position();
        self.camera.reset_rotation();
        tracing::debug!("camera reset");
    }

    fn click(&mut self) {
        if !self.camera.is_current() {
            self.camera.update();
        }
        let (x, y) = (self.cursor.x as f32, self.cursor.y as f32);
        match self.camera.unproject(x, y) {
            Ok(ray) => {
                tracing::info!(
                    x,
                    y,
                    origin = ?ray.origin.to_array(),
                    direction = ?ray.direction.to_array(),
                    "picked ray"
                );
                self.last_ray = Some(ray);
            }
            Err(e) => tracing::warn!("unproject failed: {e}"),
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        egui::SidePanel::left("arena_panel")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Arena");
                ui.separator();

                let position = self.camera.position();
                let orientation = self.camera.orientation();
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})",
                    position.x(),
                    position.y(),
                    position.z()
                ));
                ui.label(format!(
                    "Pitch {:.0}  Yaw {:.0}  Roll {:.0}",
                    orientation.pitch.to_degrees(),
                    orientation.yaw.to_degrees(),
                    orientation.roll.to_degrees()
                ));
                let fov = ui.add(
                    egui::Slider::new(&mut self.half_fov_degrees, 5.0..=80.0).text("Half FOV"),
                );
                if fov.changed() {
                    self.camera.set_half_fov(radians(self.half_fov_degrees));
                }
                if ui.button("Reset Camera (Backspace)").clicked() {
                    self.reset_camera();
                }

                ui.separator();
                ui.heading("Scene");
                if let Some(arena) = &mut self.arena {
                    let mut skin = arena.skin();
                    ui.horizontal(|ui| {
                        for (i, name) in SKIN_NAMES.iter().enumerate() {
                            ui.radio_value(&mut skin, i, *name);
                        }
                    });
                    arena.set_skin(skin);

                    let mut grid = arena.grid_visible();
                    if ui.checkbox(&mut grid, "Grid (G)").changed() {
                        arena.set_grid_visible(grid);
                    }
                }
                ui.horizontal(|ui| {
                    ui.label("Grid color");
                    ui.color_edit_button_rgba_unmultiplied(&mut self.grid_color);
                });
                ui.horizontal(|ui| {
                    ui.label("Background");
                    ui.color_edit_button_rgba_unmultiplied(&mut self.background);
                });

                if let Some(arena) = &self.arena {
                    ui.separator();
                    ui.heading("Drawables");
                    for stats in arena.stats() {
                        ui.label(format!(
                            "{}: {} / {}",
                            stats.name, stats.instances, stats.capacity
                        ));
                    }
                    let ball = arena.ball().position();
                    ui.label(format!("Ball: ({:.1}, {:.1})", ball.x(), ball.y()));
                }

                if let Some(ray) = &self.last_ray {
                    ui.separator();
                    ui.heading("Last Pick");
                    ui.label(format!("Pixel: ({:.0}, {:.0})", ray.x, ray.y));
                    let d = ray.direction.normalize();
                    ui.label(format!("Direction: ({:.2}, {:.2}, {:.2})", d.x(), d.y(), d.z()));
                }

                ui.separator();
                ui.small("F1: Panel | Arrows/PgUp/PgDn: Move | Q/E R/F Z/C: Turn | LMB: Pick");
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    gpu: Option<WgpuDevice>,
    config: Option<wgpu::SurfaceConfiguration>,
    programs: Option<Programs>,
    depth: Option<wgpu::TextureView>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    startup_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: ArenaConfig) -> Self {
        Self {
            state: AppState::new(config),
            window: None,
            surface: None,
            gpu: None,
            config: None,
            programs: None,
            depth: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            startup_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Arena")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("arena_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut gpu = WgpuDevice::new(device, queue);
        let programs = Programs::new(&gpu, surface_format)?;
        let depth = create_depth_view(&gpu.device, config.width, config.height);

        let textures = TextureSources::load(&self.state.config.textures)?.upload(|source| {
            let options = TextureOptions {
                flip_vertically: true,
                alpha: source.alpha,
            };
            load_texture_from_memory(&gpu, &source.png, options, &source.name)
        })?;
        let arena = Arena::new(&mut gpu, &self.state.config, &textures)?;

        self.state.camera.resize(config.width, config.height);
        self.state.camera.update();

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.gpu = Some(gpu);
        self.config = Some(config);
        self.programs = Some(programs);
        self.depth = Some(depth);
        self.state.arena = Some(arena);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let (Some(surface), Some(gpu), Some(config)) = (&self.surface, &self.gpu, &mut self.config)
        else {
            return;
        };
        config.width = new_size.width.max(1);
        config.height = new_size.height.max(1);
        surface.configure(&gpu.device, config);
        self.depth = Some(create_depth_view(&gpu.device, config.width, config.height));
        self.state.camera.resize(config.width, config.height);
        self.state.camera.update();
    }

    fn render(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);
        let elapsed_ms = self.state.started.elapsed().as_secs_f32() * 1000.0;

        let (Some(window), Some(surface), Some(gpu), Some(config), Some(programs), Some(depth)) = (
            &self.window,
            &self.surface,
            self.gpu.as_mut(),
            &self.config,
            &self.programs,
            &self.depth,
        ) else {
            return;
        };
        let (Some(egui_winit), Some(egui_renderer)) =
            (self.egui_winit.as_mut(), self.egui_renderer.as_mut())
        else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(&gpu.device, config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let matrices = match self.state.camera.matrices() {
            Some(m) => *m,
            None => *self.state.camera.update(),
        };
        programs.set_scene(&gpu.queue, &matrices.look_at.device, &matrices.projection.device);
        programs.set_color(&gpu.queue, self.state.grid_color);

        if let Some(arena) = self.state.arena.as_mut() {
            if let Err(e) = arena.tick(gpu, elapsed_ms) {
                tracing::warn!("ball update rejected: {e}");
            }

            let [r, g, b, a] = self.state.background.map(f64::from);
            let mut encoder = gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("arena_encoder"),
                });
            {
                let mut frame = WgpuFrame::begin(
                    &mut encoder,
                    programs,
                    &view,
                    depth,
                    wgpu::Color { r, g, b, a },
                );
                arena.draw(&mut frame);
            }
            gpu.queue.submit(std::iter::once(encoder.finish()));
        }

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.startup_error.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {e:#}");
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor = position;
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => self.state.click(),
            WindowEvent::RedrawRequested => self.render(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::default(),
    };
    tracing::info!(width = config.width, length = config.length, "arena-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.startup_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
