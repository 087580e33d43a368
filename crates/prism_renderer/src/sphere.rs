//! Sphere centred on the local origin.

use std::f64::consts::PI;

use prism_math::{Aabb, DVec2, DVec3, Interval, Ray};

use crate::hittable::LocalHit;

/// Nearest root of `|O + tD|^2 = r^2` strictly inside `ray_t`.
///
/// A ray starting inside the sphere hits the far side.
pub fn hit_sphere(radius: f64, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
    let a = ray.direction.length_squared();
    let h = ray.direction.dot(ray.origin);
    let c = ray.origin.length_squared() - radius * radius;

    if a == 0.0 {
        return None;
    }

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Smaller root first
    let mut root = (-h - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (-h + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }

    let p = ray.at(root);
    let normal = p.normalize();

    Some(LocalHit {
        t: root,
        p,
        normal,
        uv: sphere_uv(normal),
    })
}

/// Local bounds of a sphere.
pub fn sphere_bounds(radius: f64) -> Aabb {
    Aabb::from_points(DVec3::splat(-radius), DVec3::splat(radius))
}

/// UV for a point on the unit sphere: u around +Y starting at -X, v from
/// the south pole up.
fn sphere_uv(p: DVec3) -> DVec2 {
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;
    DVec2::new(phi / (2.0 * PI), theta / PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Interval = Interval::new(1e-6, f64::INFINITY);

    #[test]
    fn test_sphere_hit_front() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
        let hit = hit_sphere(1.0, &ray, WINDOW).unwrap();

        assert!((hit.t - 4.0).abs() < 1e-9);
        assert!((hit.normal - DVec3::Z).length() < 1e-9);
        assert!((hit.p - DVec3::Z).length() < 1e-9);
    }

    #[test]
    fn test_sphere_miss() {
        let ray = Ray::new(DVec3::new(0.0, 2.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
        assert!(hit_sphere(1.0, &ray, WINDOW).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let ray = Ray::new(DVec3::ZERO, DVec3::X);
        let hit = hit_sphere(2.0, &ray, WINDOW).unwrap();

        assert!((hit.t - 2.0).abs() < 1e-9);
        assert!((hit.normal - DVec3::X).length() < 1e-9);
    }

    #[test]
    fn test_sphere_far_root_when_near_outside_window() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
        let hit = hit_sphere(1.0, &ray, Interval::new(4.5, 100.0)).unwrap();

        assert!((hit.t - 6.0).abs() < 1e-9);
        assert!((hit.normal + DVec3::Z).length() < 1e-9);
    }

    #[test]
    fn test_sphere_window_upper_bound() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
        assert!(hit_sphere(1.0, &ray, Interval::new(1e-6, 3.0)).is_none());
    }

    #[test]
    fn test_sphere_unnormalized_direction_keeps_t() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -2.0));
        let hit = hit_sphere(1.0, &ray, WINDOW).unwrap();

        assert!((hit.t - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_uv_in_unit_square() {
        for p in [DVec3::X, DVec3::Y, -DVec3::Y, DVec3::Z, -DVec3::Z] {
            let uv = sphere_uv(p);
            assert!((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y), "{:?}", uv);
        }
    }
}
