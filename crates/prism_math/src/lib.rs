//! Prism math - double precision vectors, rays, intervals, bounding boxes
//! and object transforms shared by the scene description and the renderer.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod camera;
mod error;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use camera::{Camera, CameraBasis};
pub use error::{MathError, MathResult};
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Transform;

/// Smallest ray parameter accepted by scene queries, and the tolerance used
/// to reject rays running parallel to a plane.
pub const EPSILON: f64 = 1e-6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dvec3_operations() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, DVec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
    }
}
