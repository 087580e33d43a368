//! Object-to-world transforms for ray tracing.
//!
//! Keeps the forward matrix, its inverse and the normal matrix together so the
//! three can never drift apart.

use crate::{Aabb, DMat3, DMat4, DVec3, MathError, MathResult, Ray};

/// Determinants below this magnitude are treated as singular.
const SINGULAR_DETERMINANT: f64 = 1e-12;

/// An affine object transform.
///
/// - `forward`: object (local) space to world space
/// - `inverse`: world space to object space
/// - `normal`: inverse-transpose of the linear part of `forward`, used for normals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    forward: DMat4,
    inverse: DMat4,
    normal: DMat3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        forward: DMat4::IDENTITY,
        inverse: DMat4::IDENTITY,
        normal: DMat3::IDENTITY,
    };

    /// Build the transform from an object-to-world matrix.
    pub fn new(forward: DMat4) -> MathResult<Self> {
        let det = forward.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_DETERMINANT {
            return Err(MathError::SingularTransform(det));
        }

        let inverse = forward.inverse();
        let normal = DMat3::from_mat4(inverse).transpose();
        Ok(Self {
            forward,
            inverse,
            normal,
        })
    }

    /// Replace the forward matrix, re-deriving the inverse and normal matrices.
    pub fn set_forward(&mut self, forward: DMat4) -> MathResult<()> {
        *self = Self::new(forward)?;
        Ok(())
    }

    pub fn forward(&self) -> &DMat4 {
        &self.forward
    }

    pub fn inverse(&self) -> &DMat4 {
        &self.inverse
    }

    pub fn normal_matrix(&self) -> &DMat3 {
        &self.normal
    }

    /// Express a world-space ray in object space.
    ///
    /// The origin is transformed as a point and the direction as a vector
    /// (no translation). The direction is not renormalized, so the ray
    /// parameter `t` means the same thing in both frames.
    pub fn ray_to_local(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.inverse.transform_point3(ray.origin),
            self.inverse.transform_vector3(ray.direction),
        )
    }

    pub fn point_to_world(&self, p: DVec3) -> DVec3 {
        self.forward.transform_point3(p)
    }

    /// Transform an object-space normal to a world-space unit normal.
    pub fn normal_to_world(&self, n: DVec3) -> DVec3 {
        (self.normal * n).normalize()
    }

    /// World-space box enclosing an object-space box.
    ///
    /// All 8 corners go through the forward matrix; transforming only the
    /// min/max corners is wrong under rotation.
    pub fn aabb_to_world(&self, local: &Aabb) -> Aabb {
        let corners = local.corners().map(|c| self.forward.transform_point3(c));
        let (min, max) = corners[1..]
            .iter()
            .fold((corners[0], corners[0]), |(min, max), c| (min.min(*c), max.max(*c)));
        Aabb::from_points(min, max)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
