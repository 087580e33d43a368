//! Closed set of primitive shapes, all defined in their own local space.

use std::fmt;
use std::sync::Arc;

use crate::mesh::Mesh;

/// A primitive shape centred on its local origin.
#[derive(Clone, Debug)]
pub enum Shape {
    /// Sphere of `radius` around the origin
    Sphere { radius: f64 },

    /// Square in the XY plane with normal +Z, spanning `[-half_size, half_size]`
    Quad { half_size: f64 },

    /// Capped cylinder around the Y axis, spanning `[-half_height, half_height]`
    Cylinder { radius: f64, half_height: f64 },

    /// Indexed triangle mesh, shared between objects
    Mesh(Arc<Mesh>),
}

impl Shape {
    pub fn sphere(radius: f64) -> Self {
        Shape::Sphere { radius }
    }

    pub fn quad(half_size: f64) -> Self {
        Shape::Quad { half_size }
    }

    pub fn cylinder(radius: f64, half_height: f64) -> Self {
        Shape::Cylinder {
            radius,
            half_height,
        }
    }

    pub fn mesh(mesh: impl Into<Arc<Mesh>>) -> Self {
        Shape::Mesh(mesh.into())
    }

    /// Short lowercase name, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Sphere { .. } => "sphere",
            Shape::Quad { .. } => "quad",
            Shape::Cylinder { .. } => "cylinder",
            Shape::Mesh(_) => "mesh",
        }
    }

    /// Size parameters must be finite and strictly positive.
    ///
    /// Returns a description of the first offending parameter. Meshes are
    /// validated separately through [`Mesh::validate`].
    pub fn check_dimensions(&self) -> Result<(), String> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(format!("{} {} must be positive, got {}", self.kind(), name, value))
            }
        };

        match self {
            Shape::Sphere { radius } => positive("radius", *radius),
            Shape::Quad { half_size } => positive("half_size", *half_size),
            Shape::Cylinder {
                radius,
                half_height,
            } => {
                positive("radius", *radius)?;
                positive("half_height", *half_height)
            }
            Shape::Mesh(_) => Ok(()),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Sphere { radius } => write!(f, "sphere(r={})", radius),
            Shape::Quad { half_size } => write!(f, "quad(s={})", half_size),
            Shape::Cylinder {
                radius,
                half_height,
            } => write!(f, "cylinder(r={}, h={})", radius, half_height),
            Shape::Mesh(mesh) => write!(f, "mesh({} triangles)", mesh.triangle_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_dimensions() {
        assert!(Shape::sphere(1.0).check_dimensions().is_ok());
        assert!(Shape::quad(0.0).check_dimensions().is_err());
        assert!(Shape::cylinder(1.0, f64::NAN).check_dimensions().is_err());
        assert!(Shape::cylinder(-1.0, 1.0).check_dimensions().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::sphere(2.0).to_string(), "sphere(r=2)");
        assert_eq!(Shape::mesh(Mesh::default()).to_string(), "mesh(0 triangles)");
    }
}
