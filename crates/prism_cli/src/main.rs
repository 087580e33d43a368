use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use prism_core::loader::load_scene;
use prism_core::ContainerKind;
use prism_renderer::{render, render_parallel, Frame, RenderSettings, Scene};

#[derive(Parser, Debug)]
#[command(name = "prism", about = "Offline Whitted ray tracer for .ray scene files")]
struct Args {
    /// Scene file to render
    scene: PathBuf,

    /// Directory for color.bmp and depth.bmp [default: output/<scene name>]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Acceleration structure, overriding the scene file (bvh or naive)
    #[arg(short, long)]
    container: Option<ContainerKind>,

    /// Worker threads; 0 uses every core
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Render on the main thread only
    #[arg(long)]
    single_threaded: bool,

    /// Seed for jitter and soft shadow sampling
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn output_dir(args: &Args) -> PathBuf {
    args.output.clone().unwrap_or_else(|| {
        let stem = args
            .scene
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scene".to_string());
        Path::new("output").join(stem)
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let description = load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;

    let container = args.container.unwrap_or(description.container);
    let scene = Scene::build_with_container(&description, container)
        .context("Invalid scene configuration")?;

    let settings = RenderSettings::default().with_seed(args.seed);
    let mut frame = Frame::new(scene.resolution.x, scene.resolution.y);

    let stats = if args.single_threaded {
        render(&scene, &settings, &mut frame)
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build()
            .context("Failed to create render thread pool")?;
        pool.install(|| render_parallel(&scene, &settings, &mut frame))
    };

    let dir = output_dir(&args);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let color_path = dir.join("color.bmp");
    let depth_path = dir.join("depth.bmp");
    frame
        .save_color(&color_path)
        .with_context(|| format!("Failed to write {}", color_path.display()))?;
    frame
        .save_depth(&depth_path)
        .with_context(|| format!("Failed to write {}", depth_path.display()))?;

    log::info!(
        "Wrote {} and {} ({:.2?}, {} rays)",
        color_path.display(),
        depth_path.display(),
        stats.elapsed,
        stats.primary_rays + stats.secondary_rays
    );

    Ok(())
}
