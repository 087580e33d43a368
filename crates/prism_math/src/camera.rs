use crate::{DVec2, DVec3};

/// Pinhole camera parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    /// Point the camera looks at
    pub center: DVec3,
    pub up: DVec3,
    /// Vertical field of view in degrees
    pub fov_y: f64,
    /// Viewport width / height
    pub aspect: f64,
    pub z_near: f64,
    pub z_far: f64,
}

/// Orthonormal camera frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub forward: DVec3,
    pub right: DVec3,
    pub up: DVec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            center: DVec3::Z,
            up: DVec3::Y,
            fov_y: 45.0,
            aspect: 1.0,
            z_near: 1.0,
            z_far: 10000.0,
        }
    }
}

impl Camera {
    /// Orthonormal (forward, right, up) frame. `up` is re-derived so it is
    /// exactly perpendicular to `forward` even if the given up vector is not.
    pub fn basis(&self) -> CameraBasis {
        let forward = (self.center - self.position).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward);
        CameraBasis { forward, right, up }
    }

    /// Half width and half height of the image plane at unit distance.
    pub fn viewport_half_extents(&self) -> DVec2 {
        let half_height = (self.fov_y.to_radians() / 2.0).tan();
        DVec2::new(half_height * self.aspect, half_height)
    }

    /// Map a depth in `[z_near, z_far]` to `[0, 1]`.
    pub fn normalize_depth(&self, z: f64) -> f64 {
        (z - self.z_near) / (self.z_far - self.z_near)
    }
}
