//! Render loops.
//!
//! Every row owns an RNG seeded from `(seed, row)`, so the single-threaded
//! and the rayon row-parallel loops produce the same image.

use std::time::{Duration, Instant};

use prism_math::{DVec3, UVec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::camera::RayGenerator;
use crate::frame::PixelSink;
use crate::scene::Scene;
use crate::tracer::trace;

/// Rows between progress messages.
const PROGRESS_INTERVAL: u32 = 32;

/// Render-time configuration that is not part of the scene file.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub seed: u64,
    /// Colour of rays that hit nothing
    pub background: DVec3,
    /// Shadow rays per light with a non-zero radius
    pub soft_shadow_samples: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            background: DVec3::ZERO,
            soft_shadow_samples: 16,
        }
    }
}

impl RenderSettings {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_background(mut self, background: DVec3) -> Self {
        self.background = background;
        self
    }

    pub fn with_soft_shadow_samples(mut self, samples: u32) -> Self {
        self.soft_shadow_samples = samples;
        self
    }
}

/// Counters reported by a finished render.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    pub primary_rays: u64,
    /// Reflection and refraction rays
    pub secondary_rays: u64,
    pub elapsed: Duration,
}

impl RenderStats {
    fn add(&mut self, row: &RowResult) {
        self.primary_rays += row.primary_rays;
        self.secondary_rays += row.secondary_rays;
    }
}

/// One rendered row. `None` pixels had a depth outside the clip range.
struct RowResult {
    y: u32,
    pixels: Vec<Option<(DVec3, f64)>>,
    primary_rays: u64,
    secondary_rays: u64,
}

impl RowResult {
    fn write(&self, sink: &mut dyn PixelSink) {
        for (x, pixel) in self.pixels.iter().enumerate() {
            if let Some((color, depth)) = *pixel {
                sink.set_color(x as u32, self.y, color);
                sink.set_depth(x as u32, self.y, depth);
            }
        }
    }
}

fn row_rng(seed: u64, y: u32) -> StdRng {
    StdRng::seed_from_u64(seed ^ u64::from(y).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn render_row(scene: &Scene, generator: &RayGenerator, settings: &RenderSettings, y: u32) -> RowResult {
    let mut rng = row_rng(settings.seed, y);
    let camera = &scene.camera;
    let samples = scene.samples_per_pixel.max(1);

    let mut row = RowResult {
        y,
        pixels: Vec::with_capacity(scene.resolution.x as usize),
        primary_rays: 0,
        secondary_rays: 0,
    };

    for x in 0..scene.resolution.x {
        let mut color = DVec3::ZERO;
        let mut depth = 0.0;

        for _ in 0..samples {
            let jitter = RayGenerator::sample_jitter(scene.jitter_radius, &mut rng);
            let ray = generator.ray(x, y, jitter);
            let result = trace(scene, &ray, 0, camera.z_far, settings, &mut rng);

            color += result.color;
            depth += result.depth;
            row.secondary_rays += result.secondary_rays;
        }
        row.primary_rays += u64::from(samples);

        color /= f64::from(samples);
        depth /= f64::from(samples);

        let visible = depth >= camera.z_near && depth <= camera.z_far;
        row.pixels
            .push(visible.then(|| (color, camera.normalize_depth(depth))));
    }

    row
}

fn log_start(scene: &Scene, mode: &str) {
    log::info!(
        "Rendering {}x{} ({} spp, max depth {}, {})",
        scene.resolution.x,
        scene.resolution.y,
        scene.samples_per_pixel,
        scene.max_ray_depth,
        mode
    );
}

fn log_finish(stats: &RenderStats) {
    log::info!(
        "Render finished in {:.2?}: {} primary rays, {} secondary rays",
        stats.elapsed,
        stats.primary_rays,
        stats.secondary_rays
    );
}

fn log_progress(done: u32, resolution: UVec2) {
    if done % PROGRESS_INTERVAL == 0 || done == resolution.y {
        log::info!(
            "Progress: {}/{} rows ({:.0}%)",
            done,
            resolution.y,
            100.0 * f64::from(done) / f64::from(resolution.y)
        );
    }
}

/// Render `scene` scanline by scanline on the calling thread.
pub fn render(scene: &Scene, settings: &RenderSettings, sink: &mut dyn PixelSink) -> RenderStats {
    log_start(scene, "single-threaded");
    let start = Instant::now();
    let generator = RayGenerator::new(&scene.camera, scene.resolution);

    let mut stats = RenderStats::default();
    for y in 0..scene.resolution.y {
        let row = render_row(scene, &generator, settings, y);
        row.write(sink);
        stats.add(&row);
        log_progress(y + 1, scene.resolution);
    }

    stats.elapsed = start.elapsed();
    log_finish(&stats);
    stats
}

/// Render rows in parallel on the current rayon pool, then write them to
/// `sink` after the join.
pub fn render_parallel(
    scene: &Scene,
    settings: &RenderSettings,
    sink: &mut dyn PixelSink,
) -> RenderStats {
    log_start(
        scene,
        &format!("{} threads", rayon::current_num_threads()),
    );
    let start = Instant::now();
    let generator = RayGenerator::new(&scene.camera, scene.resolution);

    let rows: Vec<RowResult> = (0..scene.resolution.y)
        .into_par_iter()
        .map(|y| render_row(scene, &generator, settings, y))
        .collect();

    let mut stats = RenderStats::default();
    for row in &rows {
        row.write(sink);
        stats.add(row);
    }

    stats.elapsed = start.elapsed();
    log_finish(&stats);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use prism_core::{Material, SceneDescription, SceneObject, Shape, SphericalLight};
    use prism_math::{Camera, DMat4};

    /// Red sphere in front of a grey floor, seen from -Z.
    fn description() -> SceneDescription {
        let mut description = SceneDescription::new();
        description.options.resolution = UVec2::new(16, 12);
        description.options.samples_per_pixel = 2;
        description.options.jitter_radius = 0.5;
        description.options.max_ray_depth = 2;
        description.camera = Camera {
            position: DVec3::new(0.0, 0.0, -10.0),
            center: DVec3::ZERO,
            aspect: 16.0 / 12.0,
            ..Camera::default()
        };

        let mut red = Material::new("red", DVec3::new(1.0, 0.0, 0.0));
        red.k_reflection = 0.3;
        description.materials.insert(red);
        description
            .materials
            .insert(Material::new("grey", DVec3::splat(0.5)));

        description.objects.push(SceneObject::new(Shape::sphere(2.0), "red"));
        description.objects.push(
            SceneObject::new(Shape::quad(20.0), "grey")
                .with_transform(DMat4::from_translation(DVec3::new(0.0, 0.0, 5.0))),
        );
        description
            .lights
            .push(SphericalLight::point(DVec3::new(0.0, 5.0, -10.0), DVec3::ONE).with_radius(1.0));
        description
    }

    #[test]
    fn test_parallel_matches_single_threaded() {
        let scene = Scene::build(&description()).unwrap();
        let settings = RenderSettings::default().with_seed(9).with_soft_shadow_samples(4);

        let mut single = Frame::new(16, 12);
        let mut parallel = Frame::new(16, 12);
        let single_stats = render(&scene, &settings, &mut single);
        let parallel_stats = render_parallel(&scene, &settings, &mut parallel);

        assert_eq!(single_stats.primary_rays, 16 * 12 * 2);
        assert_eq!(single_stats.primary_rays, parallel_stats.primary_rays);
        assert_eq!(single_stats.secondary_rays, parallel_stats.secondary_rays);
        for y in 0..12 {
            for x in 0..16 {
                assert_eq!(single.get_color(x, y), parallel.get_color(x, y));
                assert_eq!(single.get_depth(x, y), parallel.get_depth(x, y));
            }
        }
    }

    #[test]
    fn test_zero_depth_renders_without_secondary_rays() {
        let mut description = description();
        description.options.max_ray_depth = 0;
        let scene = Scene::build(&description).unwrap();

        let mut frame = Frame::new(16, 12);
        let stats = render(&scene, &RenderSettings::default(), &mut frame);

        assert_eq!(stats.secondary_rays, 0);
        assert!(stats.primary_rays > 0);
    }

    #[test]
    fn test_center_sees_sphere_and_misses_read_far() {
        let mut description = description();
        description.objects.truncate(1);
        description.options.samples_per_pixel = 1;
        description.options.jitter_radius = 0.0;
        let scene = Scene::build(&description).unwrap();

        let mut frame = Frame::new(16, 12);
        render(&scene, &RenderSettings::default(), &mut frame);

        // Sphere front at distance 8 from the eye
        let center_depth = frame.get_depth(8, 6).unwrap();
        assert!((center_depth - scene.camera.normalize_depth(8.0)).abs() < 1e-3);
        assert!(frame.get_color(8, 6).unwrap().x > 0.0);

        // Corner ray misses: background written with depth 1
        assert_eq!(frame.get_depth(0, 0), Some(1.0));
        assert_eq!(frame.get_color(0, 0), Some(DVec3::ZERO));
    }

    #[test]
    fn test_hits_before_near_plane_are_not_written() {
        let mut description = description();
        description.camera.z_near = 9.0;
        description.options.samples_per_pixel = 1;
        description.options.jitter_radius = 0.0;
        let scene = Scene::build(&description).unwrap();

        let mut frame = Frame::new(16, 12);
        frame.set_color(8, 6, DVec3::new(0.0, 0.0, 1.0));
        render(&scene, &RenderSettings::default(), &mut frame);

        // The sphere is at depth ~8, inside the near plane: pixel untouched
        assert_eq!(frame.get_color(8, 6), Some(DVec3::new(0.0, 0.0, 1.0)));
    }
}
