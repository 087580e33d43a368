//! Renderer-agnostic scene description.
//!
//! A `SceneDescription` is what the loader produces: plain data, with
//! objects referring to materials by name. The renderer validates it and
//! turns it into an intersectable scene.

use std::fmt;
use std::str::FromStr;

use prism_math::{Camera, DMat4, DVec3, UVec2};

use crate::material::MaterialTable;
use crate::shape::Shape;

/// A spherical area light. Radius 0 is a point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalLight {
    pub position: DVec3,

    /// Emitted radiance (RGB)
    pub emission: DVec3,

    pub radius: f64,
}

impl SphericalLight {
    pub fn point(position: DVec3, emission: DVec3) -> Self {
        Self {
            position,
            emission,
            radius: 0.0,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn is_point(&self) -> bool {
        self.radius <= 0.0
    }
}

/// A shape placed in the world with a material.
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub shape: Shape,

    /// Object-to-world transform
    pub transform: DMat4,

    /// Key into the scene's `MaterialTable`
    pub material: String,
}

impl SceneObject {
    pub fn new(shape: Shape, material: impl Into<String>) -> Self {
        Self {
            shape,
            transform: DMat4::IDENTITY,
            material: material.into(),
        }
    }

    pub fn with_transform(mut self, transform: DMat4) -> Self {
        self.transform = transform;
        self
    }
}

/// Acceleration strategy for nearest-hit queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    #[default]
    Bvh,
    Naive,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Bvh => write!(f, "BVH"),
            ContainerKind::Naive => write!(f, "Naive"),
        }
    }
}

impl FromStr for ContainerKind {
    type Err = String;

    /// Case-insensitive: "BVH" / "bvh", "Naive" / "naive".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bvh" => Ok(ContainerKind::Bvh),
            "naive" => Ok(ContainerKind::Naive),
            _ => Err(format!("unknown container '{}', expected BVH or Naive", s)),
        }
    }
}

/// Sampling and recursion parameters carried by the scene file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Image size in pixels (width, height)
    pub resolution: UVec2,

    pub samples_per_pixel: u32,

    /// Sample jitter in pixels, applied on both axes
    pub jitter_radius: f64,

    /// Maximum number of reflection/refraction bounces
    pub max_ray_depth: u32,

    pub ambient_light: DVec3,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            resolution: UVec2::new(640, 640),
            samples_per_pixel: 1,
            jitter_radius: 0.0,
            max_ray_depth: 0,
            ambient_light: DVec3::ZERO,
        }
    }
}

/// Everything needed to render a frame, before acceleration structures exist.
#[derive(Clone, Debug, Default)]
pub struct SceneDescription {
    pub options: RenderOptions,
    pub camera: Camera,
    pub lights: Vec<SphericalLight>,
    pub materials: MaterialTable,
    pub objects: Vec<SceneObject>,
    pub container: ContainerKind,
}

impl SceneDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total triangle count over all mesh objects.
    pub fn triangle_count(&self) -> usize {
        self.objects
            .iter()
            .map(|object| match &object.shape {
                Shape::Mesh(mesh) => mesh.triangle_count(),
                _ => 0,
            })
            .sum()
    }
}
