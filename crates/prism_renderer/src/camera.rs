//! Primary ray generation.

use prism_math::{Camera, CameraBasis, DVec2, DVec3, Ray, UVec2};
use rand::{Rng, RngCore};

/// Maps pixel coordinates to world-space camera rays.
///
/// Pixel (0, 0) is the bottom-left corner of the image. The image plane
/// sits at unit distance along the camera's forward axis.
#[derive(Debug, Clone, Copy)]
pub struct RayGenerator {
    origin: DVec3,
    basis: CameraBasis,
    half_extents: DVec2,
    resolution: DVec2,
}

impl RayGenerator {
    pub fn new(camera: &Camera, resolution: UVec2) -> Self {
        Self {
            origin: camera.position,
            basis: camera.basis(),
            half_extents: camera.viewport_half_extents(),
            resolution: resolution.as_dvec2(),
        }
    }

    /// Ray through pixel `(x, y)` offset by `jitter` pixels from its centre.
    /// The direction is unit length, so hit parameters are distances.
    pub fn ray(&self, x: u32, y: u32, jitter: DVec2) -> Ray {
        let pixel = DVec2::new(x as f64, y as f64) + DVec2::splat(0.5) + jitter;
        let ndc = pixel / self.resolution * 2.0 - DVec2::ONE;

        let on_plane = self.basis.forward
            + self.basis.right * (ndc.x * self.half_extents.x)
            + self.basis.up * (ndc.y * self.half_extents.y);

        Ray::new(self.origin, on_plane.normalize())
    }

    /// Uniform offset in `[-radius, radius]` on both axes.
    pub fn sample_jitter(radius: f64, rng: &mut dyn RngCore) -> DVec2 {
        if radius > 0.0 {
            DVec2::new(
                rng.gen_range(-radius..=radius),
                rng.gen_range(-radius..=radius),
            )
        } else {
            DVec2::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator() -> RayGenerator {
        let camera = Camera {
            fov_y: 90.0,
            ..Camera::default()
        };
        RayGenerator::new(&camera, UVec2::new(2, 2))
    }

    #[test]
    fn test_centre_of_odd_image_looks_forward() {
        let generator = RayGenerator::new(&Camera::default(), UVec2::new(3, 3));
        let ray = generator.ray(1, 1, DVec2::ZERO);

        assert!((ray.direction - DVec3::Z).length() < 1e-12);
        assert_eq!(ray.origin, DVec3::ZERO);
    }

    #[test]
    fn test_bottom_left_pixel() {
        // 90 degree fov: half extents are 1, pixel (0, 0) centre is ndc (-0.5, -0.5)
        // right = forward x up = Z x Y = -X
        let ray = generator().ray(0, 0, DVec2::ZERO);
        let expected = DVec3::new(0.5, -0.5, 1.0).normalize();

        assert!((ray.direction - expected).length() < 1e-12, "{:?}", ray.direction);
    }

    #[test]
    fn test_jitter_moves_ray_within_pixel_range() {
        let g = generator();
        let centre = g.ray(0, 0, DVec2::ZERO);
        let shifted = g.ray(0, 0, DVec2::new(0.5, 0.0));
        let neighbour = g.ray(1, 0, DVec2::new(-0.5, 0.0));

        assert!((shifted.direction - neighbour.direction).length() < 1e-12);
        assert!((shifted.direction - centre.direction).length() > 0.0);
    }

    #[test]
    fn test_sample_jitter_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(RayGenerator::sample_jitter(0.0, &mut rng), DVec2::ZERO);

        for _ in 0..100 {
            let j = RayGenerator::sample_jitter(0.25, &mut rng);
            assert!(j.x.abs() <= 0.25 && j.y.abs() <= 0.25);
        }
    }
}
