//! Prism Renderer - Whitted-style CPU ray tracing
//!
//! Casts camera rays through a pinhole camera, finds the nearest hit with a
//! BVH or a linear scan, and shades it with ambient, diffuse and Blinn
//! specular terms, shadow rays, and recursive reflection and refraction.
//!
//! Scenes come from [`prism_core::SceneDescription`] and are validated by
//! [`Scene::build`] before any ray is cast.

mod bvh;
mod camera;
mod cylinder;
mod error;
mod frame;
mod hittable;
mod naive;
mod object;
mod quad;
mod renderer;
mod scene;
mod shading;
mod sphere;
mod tracer;
mod triangle;

pub use bvh::{Bvh, BvhNode};
pub use camera::RayGenerator;
pub use error::{ObjectError, ObjectResult, SceneError, SceneResult};
pub use frame::{Frame, PixelSink};
pub use hittable::{HitRecord, Hittable, LocalHit, MaterialId};
pub use naive::NaiveList;
pub use object::{local_bounds, Object};
pub use renderer::{render, render_parallel, RenderSettings, RenderStats};
pub use scene::Scene;
pub use shading::{reflect, refract, shade};
pub use tracer::{trace, TraceResult};

/// Re-export common math types from prism_math
pub use prism_math::{Aabb, DVec2, DVec3, Interval, Ray, EPSILON};

/// Distance secondary rays are pushed off the surface they leave from.
pub const RAY_OFFSET: f64 = 1e-4;
