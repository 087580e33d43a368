//! Square in the local XY plane, normal +Z.

use prism_math::{Aabb, DVec2, DVec3, Interval, Ray, EPSILON};

use crate::hittable::LocalHit;

/// Plane intersection with the `z = 0` plane, kept if `|x|, |y| <= half_size`.
pub fn hit_quad(half_size: f64, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
    let denom = ray.direction.z;

    // Near-parallel rays. Relative to |D|: local directions are not unit
    if denom.abs() <= EPSILON * ray.direction.length() {
        return None;
    }

    let t = -ray.origin.z / denom;
    if !ray_t.surrounds(t) {
        return None;
    }

    let p = ray.at(t);
    if p.x.abs() > half_size || p.y.abs() > half_size {
        return None;
    }

    Some(LocalHit {
        t,
        p: DVec3::new(p.x, p.y, 0.0),
        normal: DVec3::Z,
        uv: DVec2::new(
            (p.x / half_size + 1.0) / 2.0,
            (p.y / half_size + 1.0) / 2.0,
        ),
    })
}

/// Local bounds of a quad (zero thickness along Z).
pub fn quad_bounds(half_size: f64) -> Aabb {
    Aabb::from_points(
        DVec3::new(-half_size, -half_size, 0.0),
        DVec3::new(half_size, half_size, 0.0),
    )
}
