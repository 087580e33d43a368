//! Prism Core - renderer-agnostic scene description.
//!
//! This crate provides:
//!
//! - **Scene description types**: `SceneDescription`, `SceneObject`, `Shape`,
//!   `SphericalLight`, `RenderOptions`
//! - **Material registry**: `Material`, `MaterialTable`, `Texture`, `TextureCache`
//! - **Mesh geometry**: `Mesh`, with OBJ loading
//! - **Scene files**: lexing, parsing and loading of `.ray` scene files
//!
//! # Example
//!
//! ```ignore
//! use prism_core::loader::load_scene;
//!
//! let description = load_scene("data/scene/spheres.ray")?;
//! println!("Loaded {} objects, {} lights",
//!     description.objects.len(),
//!     description.lights.len());
//! ```

pub mod loader;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod shape;
pub mod texture;

// Re-export commonly used types
pub use material::{Material, MaterialTable};
pub use mesh::{Mesh, MeshError, MeshResult};
pub use scene::{ContainerKind, RenderOptions, SceneDescription, SceneObject, SphericalLight};
pub use shape::Shape;
pub use texture::{Texture, TextureCache, TextureError, TextureResult};
