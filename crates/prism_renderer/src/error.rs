//! Scene configuration errors, detected before rendering starts.

use prism_core::MeshError;
use prism_math::MathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Object {object} references undefined material '{name}'")]
    MissingMaterial { object: usize, name: String },

    #[error("Object {object}: {reason}")]
    InvalidShape { object: usize, reason: String },

    #[error("Object {object} mesh: {source}")]
    Mesh {
        object: usize,
        #[source]
        source: MeshError,
    },

    #[error("Object {object}: {source}")]
    Math {
        object: usize,
        #[source]
        source: MathError,
    },

    #[error("Material '{name}': {reason}")]
    InvalidMaterial { name: String, reason: String },

    #[error("Invalid render settings: {0}")]
    InvalidSettings(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Why an `Object` could not be placed in the world.
#[derive(Error, Debug)]
pub enum ObjectError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

pub type ObjectResult<T> = Result<T, ObjectError>;
