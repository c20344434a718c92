use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::{UVec2, Vec3};
use tidewater_assets::{
    AssetSource, FsAssetSource, MeshBuilder, SceneManifest,
    builtin::{builtin_source, demo_manifest},
};
use tidewater_input::{InputFrame, MoveIntent};
use tidewater_kernel::{Camera, CameraConfig, Session, SessionConfig};
use tidewater_render::{
    MirroredView, ReflectionRenderer, RecordingRenderer, RenderPass, build_session,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tidewater-cli", about = "CLI tool for tidewater")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Session config (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Scene manifest (JSON); the built-in harbor scene when omitted
    #[arg(long, global = true)]
    scene: Option<PathBuf>,

    /// Asset root for the scene; defaults to the manifest's directory
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Ingest an OBJ file and print mesh statistics
    Mesh {
        /// Path to the .obj file
        file: PathBuf,
    },
    /// Run the reflection orchestration headless and print the command log
    Frame {
        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        frames: u64,
        /// Hold forward for every frame
        #[arg(long)]
        walk: bool,
        /// Viewport width
        #[arg(long, default_value = "1280")]
        width: u32,
        /// Viewport height
        #[arg(long, default_value = "720")]
        height: u32,
        /// Print frame reports only
        #[arg(short, long)]
        quiet: bool,
    },
    /// Mirror a camera across the water plane and restore it
    Mirror {
        /// Camera height
        #[arg(long, default_value = "33")]
        y: f32,
        /// Camera pitch in degrees
        #[arg(long, default_value = "-20", allow_hyphen_values = true)]
        pitch: f32,
        /// Water height
        #[arg(long, default_value = "13")]
        water: f32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match &cli.command {
        Commands::Info => {
            println!("tidewater-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", tidewater_common::crate_info());
            println!("assets: {}", tidewater_assets::crate_info());
            println!("render: {}", tidewater_render::crate_info());
            let config = SessionConfig::default();
            println!(
                "defaults: water_height={} reflection={}x{} wave_speed={}",
                config.water_height,
                config.reflection_size[0],
                config.reflection_size[1],
                config.wave_speed
            );
        }
        Commands::Mesh { file } => inspect_mesh(file)?,
        Commands::Frame {
            frames,
            walk,
            width,
            height,
            quiet,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let viewport = UVec2::new(*width, *height);
            tracing::info!(frames, walk, width, height, "headless run starting");
            let mut renderer = RecordingRenderer::new();
            let (mut session, reflection) = match &cli.scene {
                Some(path) => {
                    let manifest = SceneManifest::load(path)
                        .with_context(|| format!("loading scene {}", path.display()))?;
                    let source = FsAssetSource::new(asset_root(path, cli.assets.as_deref()));
                    setup(&manifest, &source, &mut renderer, config, viewport)?
                }
                None => setup(
                    &demo_manifest(),
                    &builtin_source(),
                    &mut renderer,
                    config,
                    viewport,
                )?,
            };
            if !quiet {
                print!("{}", renderer.log());
            }
            renderer.take_commands();

            let intent = MoveIntent {
                forward: *walk,
                ..MoveIntent::default()
            };
            for _ in 0..*frames {
                let input = InputFrame {
                    intent,
                    ..InputFrame::default()
                };
                let report = reflection.render_frame(&mut session, &mut renderer, input)?;
                if !quiet {
                    print!("{}", renderer.log());
                }
                let water_draws = renderer
                    .draws_in(RenderPass::Main)
                    .filter(|d| d.water.is_some())
                    .count();
                renderer.take_commands();
                println!(
                    "frame {}: reflection={} main={} water={} mirrored_y={:.3} eye=({:.2}, {:.2}, {:.2}) wave={:.4}",
                    report.frame,
                    report.reflection_draws,
                    report.main_draws,
                    water_draws,
                    report.mirrored_camera_y,
                    report.camera_position.x,
                    report.camera_position.y,
                    report.camera_position.z,
                    report.wave_factor
                );
            }
            tracing::info!(frames, frame = session.frame(), "headless run finished");
        }
        Commands::Mirror { y, pitch, water } => {
            let config = CameraConfig {
                spawn: Vec3::new(0.0, *y, 0.0),
                ..CameraConfig::default()
            };
            let mut camera = Camera::new(&config, UVec2::new(1280, 720));
            camera.pitch = pitch.to_radians().clamp(-camera.pitch_limit(), camera.pitch_limit());
            camera.recompute();
            let before = (camera.position, camera.pitch);

            let mirror = MirroredView::enter(&mut camera, *water);
            println!(
                "mirrored: y={:.4} pitch={:.2}deg distance={:.4}",
                camera.position.y,
                camera.pitch.to_degrees(),
                mirror.distance()
            );
            mirror.restore(&mut camera);
            camera.recompute();
            println!(
                "restored: y={:.4} pitch={:.2}deg",
                camera.position.y,
                camera.pitch.to_degrees()
            );
            let exact = before == (camera.position, camera.pitch);
            println!("Match: {}", if exact { "OK" } else { "MISMATCH" });
        }
    }

    Ok(())
}

fn inspect_mesh(file: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let mesh = MeshBuilder::new()
        .build(&text)
        .with_context(|| format!("parsing {}", file.display()))?;

    println!("mesh: {}", file.display());
    println!("vertices: {}", mesh.vertex_count());
    println!("triangles: {}", mesh.triangle_count());
    println!("indices: {}", mesh.indices().len());
    println!("texcoords: {}", if mesh.has_texcoords() { "yes" } else { "no" });
    println!("degenerate normals: {}", mesh.degenerate_vertex_count());
    match mesh.bounds() {
        Some((min, max)) => println!(
            "bounds: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        ),
        None => println!("bounds: empty"),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SessionConfig> {
    match path {
        Some(path) => {
            let config = SessionConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            tracing::info!(path = %path.display(), "session config loaded");
            Ok(config)
        }
        None => {
            tracing::debug!("using default session config");
            Ok(SessionConfig::default())
        }
    }
}

fn asset_root(scene: &Path, assets: Option<&Path>) -> PathBuf {
    match assets {
        Some(root) => root.to_path_buf(),
        None => scene
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

fn setup(
    manifest: &SceneManifest,
    source: &impl AssetSource,
    renderer: &mut RecordingRenderer,
    config: SessionConfig,
    viewport: UVec2,
) -> anyhow::Result<(Session, ReflectionRenderer)> {
    Ok(build_session(manifest, source, renderer, config, viewport)?)
}
