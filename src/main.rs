use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use glam::{vec3a, Vec3A};
use log::{error, info};

use progressive_ray_tracing::config::{MeshConfig, RenderConfig};
use progressive_ray_tracing::define_scene::{cornell_box, cornell_camera, cornell_light};
use progressive_ray_tracing::image_output::save_image;
use progressive_ray_tracing::{FrameSetup, RenderSettings, Renderer, Result};

#[derive(Parser, Debug)]
#[command(name = "progressive_ray_tracing")]
#[command(about = "Renders the Cornell box with progressive area light sampling", long_about = None)]
struct Cli {
    /// Image width in pixels
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Tile width in pixels
    #[arg(long, default_value_t = 16)]
    blocks_wide: u32,

    /// Number of frames to accumulate
    #[arg(long, default_value_t = 64)]
    frames: u32,

    /// Path vertices per pixel, 1 is direct lighting only
    #[arg(long, default_value_t = 1)]
    bounces: u32,

    /// Shadow rays per shading event
    #[arg(long, default_value_t = 1)]
    light_samples: u32,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 45.0)]
    fov: f32,

    /// Emitted radiance of the light, same for all channels
    #[arg(long, default_value_t = 4.0)]
    light_power: f32,

    /// Worker threads, defaults to one per core
    #[arg(long)]
    threads: Option<usize>,

    /// Write linear values to 8 bit images instead of gamma corrected ones
    #[arg(long)]
    linear: bool,

    /// Output file, .hdr and .exr keep the unclamped values
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// STL mesh to place on the floor of the box
    #[arg(long)]
    mesh: Option<PathBuf>,

    /// Size of the mesh relative to its bounding box diagonal
    #[arg(long, default_value_t = 0.8)]
    mesh_scale: f32,

    /// Rotation of the mesh around the y axis in degrees
    #[arg(long, default_value_t = 0.0)]
    mesh_rotation: f32,
}

impl From<Cli> for RenderConfig {
    fn from(cli: Cli) -> Self {
        RenderConfig {
            width: cli.width,
            height: cli.height,
            blocks_wide: cli.blocks_wide,
            frames: cli.frames,
            settings: RenderSettings {
                max_bounces: cli.bounces,
                light_samples: cli.light_samples,
            },
            vertical_fov: cli.fov,
            light_color: Vec3A::splat(cli.light_power),
            threads: cli.threads,
            gamma_correct: !cli.linear,
            output: cli.output,
            mesh: cli.mesh.map(|path| MeshConfig {
                path,
                scale: cli.mesh_scale,
                position: vec3a(0.0, 0.0, 0.0),
                rotation: vec3a(0.0, cli.mesh_rotation, 0.0),
                color: vec3a(0.725, 0.71, 0.68),
            }),
        }
    }
}

fn run(config: RenderConfig) -> Result<()> {
    config.validate()?;

    let mut scene = cornell_box(config.light_color);
    if let Some(mesh) = &config.mesh {
        scene.add_stl(
            &mesh.path,
            mesh.scale,
            mesh.position,
            mesh.rotation,
            mesh.color,
        )?;
    }

    info!(
        "scene has {} objects and {} triangles",
        scene.objects.len(),
        scene.triangle_count()
    );

    let camera = cornell_camera()
        .with_vertical_fov(config.vertical_fov)
        .basis(config.width, config.height);
    let light = cornell_light(config.light_color);

    let mut renderer = Renderer::new(config.settings);
    if let Some(threads) = config.threads {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(thread_pool) => renderer = renderer.with_thread_pool(thread_pool),
            Err(err) => error!("could not build a {threads} thread pool, using the global one: {err}"),
        }
    }

    let mut frame_setup = FrameSetup::new(config.blocks_wide);
    let start_time = Instant::now();

    for _ in 0..config.frames.max(1) {
        let uniforms = frame_setup.next_uniforms(config.width, config.height, camera, light);
        let status = renderer.render_frame(&scene, &uniforms)?;
        frame_setup.finish_frame(status);
    }

    let elapsed = start_time.elapsed().as_secs_f32();
    info!(
        "accumulated {} frames in {:.2} s ({:.1} ms per frame)",
        renderer.accumulator().frame_count(),
        elapsed,
        elapsed * 1000.0 / config.frames.max(1) as f32
    );

    save_image(
        &config.output,
        renderer.accumulated_image(),
        config.width,
        config.height,
        config.gamma_correct,
    )
}

pub fn main() -> ExitCode {
    env_logger::init();

    let config = RenderConfig::from(Cli::parse());

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
