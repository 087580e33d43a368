//! Hittable trait and HitRecord for ray-object intersection.

use prism_math::{Aabb, DVec2, DVec3, Interval, Ray};

/// Index of a material in the scene's material list.
pub type MaterialId = usize;

/// Record of the nearest ray-object intersection found so far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    /// Ray parameter of the hit; `INFINITY` until something is hit
    pub t: f64,
    /// World-space position
    pub p: DVec3,
    /// World-space unit geometric normal (outward, not flipped toward the ray)
    pub normal: DVec3,
    /// Texture coordinates
    pub uv: DVec2,
    pub material: MaterialId,
}

impl Default for HitRecord {
    fn default() -> Self {
        Self {
            t: f64::INFINITY,
            p: DVec3::ZERO,
            normal: DVec3::ZERO,
            uv: DVec2::ZERO,
            material: 0,
        }
    }
}

impl HitRecord {
    pub fn is_hit(&self) -> bool {
        self.t.is_finite()
    }
}

/// A hit in a shape's local space, before the owning object maps it to
/// world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalHit {
    pub t: f64,
    pub p: DVec3,
    pub normal: DVec3,
    pub uv: DVec2,
}

/// Trait for things that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Find the nearest hit with `t` strictly inside `ray_t`.
    ///
    /// On success fills `rec` and returns true. On a miss `rec` is untouched.
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord) -> bool;

    /// World-space bounding box.
    fn bounding_box(&self) -> Aabb;
}
