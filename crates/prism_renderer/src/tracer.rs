//! Whitted recursive trace: nearest hit, local shading, then reflection and
//! refraction rays up to the scene's recursion limit.

use prism_math::{DVec3, Interval, Ray, EPSILON};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::renderer::RenderSettings;
use crate::scene::Scene;
use crate::shading::{reflect, refract, shade};
use crate::RAY_OFFSET;

/// Outcome of tracing one ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceResult {
    pub color: DVec3,
    /// Ray parameter of the nearest hit, or the incoming bound on a miss
    pub depth: f64,
    /// Reflection and refraction traces spawned below this one
    pub secondary_rays: u64,
}

impl TraceResult {
    fn miss(background: DVec3, depth: f64) -> Self {
        Self {
            color: background,
            depth,
            secondary_rays: 0,
        }
    }
}

/// Trace `ray` against `scene`, looking no further than `z_max`.
///
/// `ray_depth` is the recursion level of this ray (0 for camera rays).
/// Recursion stops once it reaches `scene.max_ray_depth`.
pub fn trace(
    scene: &Scene,
    ray: &Ray,
    ray_depth: u32,
    z_max: f64,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> TraceResult {
    let mut rec = HitRecord::default();
    if !scene.hit(ray, Interval::new(EPSILON, z_max), &mut rec) {
        return TraceResult::miss(settings.background, z_max);
    }

    let mut result = TraceResult {
        color: shade(scene, ray, &rec, settings, rng),
        depth: rec.t,
        secondary_rays: 0,
    };

    let material = scene.material(rec.material);
    if ray_depth >= scene.max_ray_depth || !material.is_recursive() {
        return result;
    }

    let d = ray.direction.normalize();

    if material.k_reflection > 0.0 {
        let (color, count) = trace_reflection(scene, d, &rec, ray_depth, settings, rng);
        result.color += material.k_reflection * color;
        result.secondary_rays += count;
    }

    if material.k_refraction > 0.0 {
        let entering = d.dot(rec.normal) < 0.0;
        let (n, eta) = if entering {
            (rec.normal, 1.0 / material.refractive_index)
        } else {
            (-rec.normal, material.refractive_index)
        };

        let (color, count) = match refract(d, n, eta) {
            Some(direction) => {
                let secondary = Ray::new(rec.p - n * RAY_OFFSET, direction);
                let traced = trace(scene, &secondary, ray_depth + 1, f64::INFINITY, settings, rng);
                (traced.color, traced.secondary_rays + 1)
            }
            // Total internal reflection
            None => trace_reflection(scene, d, &rec, ray_depth, settings, rng),
        };
        result.color += material.k_refraction * color;
        result.secondary_rays += count;
    }

    result
}

fn trace_reflection(
    scene: &Scene,
    d: DVec3,
    rec: &HitRecord,
    ray_depth: u32,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> (DVec3, u64) {
    // Leave from the side the ray arrived on
    let n = if d.dot(rec.normal) < 0.0 {
        rec.normal
    } else {
        -rec.normal
    };
    let secondary = Ray::new(rec.p + n * RAY_OFFSET, reflect(d, n));
    let traced = trace(scene, &secondary, ray_depth + 1, f64::INFINITY, settings, rng);
    (traced.color, traced.secondary_rays + 1)
}
