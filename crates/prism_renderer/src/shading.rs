//! Local illumination: ambient, Lambert diffuse and Blinn specular, with
//! shadow rays toward every light.

use prism_core::SphericalLight;
use prism_math::{DVec3, Interval, Ray, EPSILON};
use rand::{Rng, RngCore};

use crate::hittable::HitRecord;
use crate::renderer::RenderSettings;
use crate::scene::Scene;
use crate::RAY_OFFSET;

/// Mirror `d` about `n`.
#[inline]
pub fn reflect(d: DVec3, n: DVec3) -> DVec3 {
    d - 2.0 * d.dot(n) * n
}

/// Snell refraction of unit `d` through unit `n` (facing against `d`) with
/// relative index `eta = n_from / n_to`. `None` on total internal reflection.
pub fn refract(d: DVec3, n: DVec3, eta: f64) -> Option<DVec3> {
    let cos_i = (-d.dot(n)).min(1.0);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some(eta * d + (eta * cos_i - k.sqrt()) * n)
}

/// Colour leaving `hit` toward the origin of `ray`, excluding recursive
/// reflection and refraction.
pub fn shade(
    scene: &Scene,
    ray: &Ray,
    hit: &HitRecord,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> DVec3 {
    let material = scene.material(hit.material);
    let albedo = material.albedo_at(hit.uv);

    let d = ray.direction.normalize();
    let n = if hit.normal.dot(d) > 0.0 {
        -hit.normal
    } else {
        hit.normal
    };
    let v = -d;

    let mut color = scene.ambient_light * material.k_ambient * albedo;

    // 0 = white dielectric highlight, 1 = albedo-coloured metal
    let specular_tint = DVec3::ONE.lerp(albedo, material.metallic);
    let shadow_origin = hit.p + n * RAY_OFFSET;

    for light in &scene.lights {
        let l = (light.position - hit.p).normalize();
        let n_dot_l = n.dot(l);
        if n_dot_l <= 0.0 {
            continue;
        }

        let diffuse = material.k_diffuse * albedo * n_dot_l;
        let h = (l + v).normalize();
        let specular =
            material.k_specular * n.dot(h).max(0.0).powf(material.shininess) * specular_tint;

        let unlit = diffuse + specular;
        if unlit == DVec3::ZERO {
            continue;
        }

        let visibility = light_visibility(scene, shadow_origin, light, settings, rng);
        color += light.emission * unlit * visibility;
    }

    color
}

/// Fraction of the light visible from `origin`: 0 or 1 for a point light,
/// the unoccluded share of `soft_shadow_samples` points inside the sphere
/// otherwise.
fn light_visibility(
    scene: &Scene,
    origin: DVec3,
    light: &SphericalLight,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> f64 {
    if light.is_point() || settings.soft_shadow_samples <= 1 {
        return if occluded(scene, origin, light.position) {
            0.0
        } else {
            1.0
        };
    }

    let samples = settings.soft_shadow_samples;
    let visible = (0..samples)
        .filter(|_| {
            let target = light.position + random_in_unit_sphere(rng) * light.radius;
            !occluded(scene, origin, target)
        })
        .count();

    visible as f64 / samples as f64
}

/// True if anything lies strictly between `origin` and `target`.
fn occluded(scene: &Scene, origin: DVec3, target: DVec3) -> bool {
    let to_target = target - origin;
    let distance = to_target.length();
    if distance <= EPSILON {
        return false;
    }

    let ray = Ray::new(origin, to_target / distance);
    let mut rec = HitRecord::default();
    scene.hit(&ray, Interval::new(EPSILON, distance), &mut rec)
}

fn random_in_unit_sphere(rng: &mut dyn RngCore) -> DVec3 {
    loop {
        let p = DVec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
