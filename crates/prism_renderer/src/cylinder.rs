//! Capped cylinder around the local Y axis.

use std::f64::consts::PI;

use prism_math::{Aabb, DVec2, DVec3, Interval, Ray, EPSILON};

use crate::hittable::LocalHit;

/// Nearest of up to four candidates: the two caps at `y = +-half_height`
/// and the two roots of the lateral surface whose `|y| <= half_height`.
pub fn hit_cylinder(
    radius: f64,
    half_height: f64,
    ray: &Ray,
    ray_t: Interval,
) -> Option<LocalHit> {
    let mut best: Option<LocalHit> = None;
    let mut window = ray_t;

    let mut consider = |hit: LocalHit, window: &mut Interval| {
        *window = window.with_max(hit.t);
        best = Some(hit);
    };

    // Caps, skipped for rays parallel to them (relative to |D|)
    if ray.direction.y.abs() > EPSILON * ray.direction.length() {
        for (cap_y, normal) in [(half_height, DVec3::Y), (-half_height, -DVec3::Y)] {
            let t = (cap_y - ray.origin.y) / ray.direction.y;
            if !window.surrounds(t) {
                continue;
            }

            let p = ray.at(t);
            if p.x * p.x + p.z * p.z <= radius * radius {
                consider(
                    LocalHit {
                        t,
                        p: DVec3::new(p.x, cap_y, p.z),
                        normal,
                        uv: DVec2::new(
                            (p.x / radius + 1.0) / 2.0,
                            (p.z / radius + 1.0) / 2.0,
                        ),
                    },
                    &mut window,
                );
            }
        }
    }

    // Lateral surface: the quadratic with the Y component projected out
    let a = ray.direction.x * ray.direction.x + ray.direction.z * ray.direction.z;
    if a > 0.0 {
        let h = ray.direction.x * ray.origin.x + ray.direction.z * ray.origin.z;
        let c = ray.origin.x * ray.origin.x + ray.origin.z * ray.origin.z - radius * radius;
        let discriminant = h * h - a * c;

        if discriminant >= 0.0 {
            let sqrtd = discriminant.sqrt();
            for t in [(-h - sqrtd) / a, (-h + sqrtd) / a] {
                if !window.surrounds(t) {
                    continue;
                }

                let p = ray.at(t);
                if p.y.abs() > half_height {
                    continue;
                }

                let normal = DVec3::new(p.x, 0.0, p.z).normalize();
                let phi = (-p.z).atan2(p.x) + PI;
                consider(
                    LocalHit {
                        t,
                        p,
                        normal,
                        uv: DVec2::new(
                            phi / (2.0 * PI),
                            (p.y + half_height) / (2.0 * half_height),
                        ),
                    },
                    &mut window,
                );
            }
        }
    }

    best
}

/// Local bounds of a capped cylinder.
pub fn cylinder_bounds(radius: f64, half_height: f64) -> Aabb {
    Aabb::from_points(
        DVec3::new(-radius, -half_height, -radius),
        DVec3::new(radius, half_height, radius),
    )
}
