use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::UVec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tidewater_assets::builtin::{builtin_source, demo_manifest};
use tidewater_assets::{FsAssetSource, SceneManifest};
use tidewater_input::{InputAccumulator, Key};
use tidewater_kernel::{Session, SessionConfig};
use tidewater_render::{FrameReport, ReflectionRenderer, build_session};
use tidewater_render_wgpu::WgpuRenderer;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "tidewater-desktop", about = "Planar-reflection water viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Session config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scene manifest (JSON); the built-in harbor scene when omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Asset root for the scene; defaults to the manifest's directory
    #[arg(long)]
    assets: Option<PathBuf>,
}

/// Where the scene comes from, resolved before the window exists.
enum SceneChoice {
    Builtin,
    Files {
        manifest: SceneManifest,
        root: PathBuf,
    },
}

impl SceneChoice {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let Some(path) = &cli.scene else {
            return Ok(Self::Builtin);
        };
        let manifest = SceneManifest::load(path)
            .with_context(|| format!("loading scene {}", path.display()))?;
        let root = match &cli.assets {
            Some(root) => root.clone(),
            None => path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        Ok(Self::Files { manifest, root })
    }

    fn build(
        &self,
        renderer: &mut WgpuRenderer,
        config: SessionConfig,
        viewport: UVec2,
    ) -> Result<(Session, ReflectionRenderer)> {
        let built = match self {
            Self::Builtin => {
                build_session(&demo_manifest(), &builtin_source(), renderer, config, viewport)?
            }
            Self::Files { manifest, root } => build_session(
                manifest,
                &FsAssetSource::new(root),
                renderer,
                config,
                viewport,
            )?,
        };
        Ok(built)
    }
}

/// Everything that exists once the window and device are up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    session: Session,
    reflection: ReflectionRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct DesktopApp {
    config: SessionConfig,
    scene: SceneChoice,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    input: InputAccumulator,
    pointer_locked: bool,
    show_hud: bool,
    last_report: Option<FrameReport>,
    last_frame: Instant,
    fps: f32,
}

impl DesktopApp {
    fn new(config: SessionConfig, scene: SceneChoice) -> Self {
        Self {
            config,
            scene,
            gpu: None,
            egui_ctx: EguiContext::default(),
            input: InputAccumulator::new(),
            pointer_locked: false,
            show_hud: true,
            last_report: None,
            last_frame: Instant::now(),
            fps: 0.0,
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Tidewater")
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
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tidewater_device"),
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
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
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
        surface.configure(&device, &surface_config);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);
        let mut renderer = WgpuRenderer::new(
            device,
            queue,
            surface_format,
            surface_config.width,
            surface_config.height,
        );
        let viewport = UVec2::new(surface_config.width, surface_config.height);
        let (session, reflection) = self.scene.build(&mut renderer, self.config, viewport)?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        Ok(Gpu {
            window,
            surface,
            surface_config,
            renderer,
            session,
            reflection,
            egui_winit,
            egui_renderer,
        })
    }

    fn lock_pointer(&mut self) {
        let Some(gpu) = &self.gpu else { return };
        let grabbed = gpu
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| gpu.window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                gpu.window.set_cursor_visible(false);
                self.pointer_locked = true;
            }
            Err(e) => tracing::warn!("pointer lock unavailable: {e}"),
        }
    }

    fn release_pointer(&mut self) {
        if let Some(gpu) = &self.gpu {
            let _ = gpu.window.set_cursor_grab(CursorGrabMode::None);
            gpu.window.set_cursor_visible(true);
        }
        self.pointer_locked = false;
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        match code {
            KeyCode::Escape if pressed => self.release_pointer(),
            KeyCode::F1 if pressed => self.show_hud = !self.show_hud,
            _ => {
                if let Some(key) = Key::from_label(&format!("{code:?}")) {
                    self.input.key(key, pressed);
                }
            }
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(gpu) = &mut self.gpu else { return };
        gpu.surface_config.width = size.width.max(1);
        gpu.surface_config.height = size.height.max(1);
        gpu.surface
            .configure(gpu.renderer.device(), &gpu.surface_config);
        if gpu
            .session
            .resize(gpu.surface_config.width, gpu.surface_config.height)
        {
            gpu.renderer
                .resize(gpu.surface_config.width, gpu.surface_config.height);
            tracing::debug!(
                width = gpu.surface_config.width,
                height = gpu.surface_config.height,
                "viewport resized"
            );
        }
    }

    fn redraw(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        if dt > 0.0 {
            self.fps = self.fps * 0.9 + (1.0 / dt) * 0.1;
        }

        let Some(gpu) = &mut self.gpu else {
            return Ok(());
        };

        let frame = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface
                    .configure(gpu.renderer.device(), &gpu.surface_config);
                return Ok(());
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return Ok(());
            }
        };
        gpu.renderer.set_output(
            frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
        );

        let report = gpu.reflection.render_frame(
            &mut gpu.session,
            &mut gpu.renderer,
            self.input.take_frame(),
        )?;
        self.last_report = Some(report);

        if self.show_hud {
            let hud = HudState {
                report,
                yaw: gpu.session.camera.yaw,
                fps: self.fps,
                pointer_locked: self.pointer_locked,
            };
            let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
            let full_output = self.egui_ctx.run(raw_input, |ctx| draw_hud(ctx, &hud));
            gpu.egui_winit
                .handle_platform_output(&gpu.window, full_output.platform_output);

            let paint_jobs = self
                .egui_ctx
                .tessellate(full_output.shapes, full_output.pixels_per_point);
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [gpu.surface_config.width, gpu.surface_config.height],
                pixels_per_point: full_output.pixels_per_point,
            };

            let device = gpu.renderer.device();
            let queue = gpu.renderer.queue();
            let view = gpu
                .renderer
                .output()
                .context("output view dropped before the HUD pass")?;
            for (id, image_delta) in &full_output.textures_delta.set {
                gpu.egui_renderer
                    .update_texture(device, queue, *id, image_delta);
            }
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
            gpu.egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view,
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
                gpu.egui_renderer
                    .render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                gpu.egui_renderer.free_texture(id);
            }
        }

        gpu.renderer.take_output();
        frame.present();
        gpu.window.request_redraw();
        Ok(())
    }
}

struct HudState {
    report: FrameReport,
    yaw: f32,
    fps: f32,
    pointer_locked: bool,
}

fn draw_hud(ctx: &EguiContext, hud: &HudState) {
    let r = &hud.report;
    egui::Window::new("Tidewater")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("Frame: {}  ({:.0} fps)", r.frame, hud.fps));
            ui.separator();
            ui.heading("Camera");
            ui.label(format!(
                "Position: ({:.2}, {:.2}, {:.2})",
                r.camera_position.x, r.camera_position.y, r.camera_position.z
            ));
            ui.label(format!(
                "Yaw: {:.1}°  Pitch: {:.1}°",
                hud.yaw.to_degrees(),
                r.pitch.to_degrees()
            ));
            ui.separator();
            ui.heading("Reflection");
            ui.label(format!(
                "Mirrored Y: {:.2}  (offset {:.2})",
                r.mirrored_camera_y, r.mirror_distance
            ));
            ui.label(format!(
                "Draws: {} reflection / {} main",
                r.reflection_draws, r.main_draws
            ));
            ui.label(format!("Wave factor: {:.4}", r.wave_factor));
            ui.separator();
            ui.small(if hud.pointer_locked {
                "Esc: release pointer | WASD: move | F1: HUD"
            } else {
                "Click: look | WASD: move | F1: HUD"
            });
        });
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("startup failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.show_hud && !self.pointer_locked {
            if let Some(gpu) = &mut self.gpu {
                let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::Focused(false) => {
                self.input.release_all();
                self.release_pointer();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(code, state == ElementState::Pressed),
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } if !self.pointer_locked => self.lock_pointer(),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    tracing::error!("frame failed: {e:#}");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.pointer_locked {
                self.input.pointer(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("tidewater-desktop starting");

    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    let scene = SceneChoice::from_cli(&cli)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(config, scene);
    event_loop.run_app(&mut app)?;

    Ok(())
}
