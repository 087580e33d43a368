//! `.ray` scene file loading.
//!
//! A scene file is a flat list of commands (see [`Parser`]). Loading
//! produces a [`SceneDescription`]; it does not build any acceleration
//! structure.
//!
//! # Example
//!
//! ```ignore
//! use prism_core::loader::load_scene;
//!
//! let description = load_scene("data/scene/spheres.ray")?;
//! ```

mod lexer;
mod parser;

pub use lexer::{Lexer, ParamList, ParseError, ParseResult, Token, TokenKind};
pub use parser::Parser;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::mesh::MeshError;
use crate::scene::SceneDescription;
use crate::texture::TextureError;

/// Errors that can occur while loading a scene file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Failed to load mesh {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: MeshError,
    },

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Object at line {line} references undefined material '{name}'")]
    MissingMaterial { line: usize, name: String },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load a scene file. Relative mesh and texture paths resolve against the
/// file's directory.
pub fn load_scene(path: impl AsRef<Path>) -> LoadResult<SceneDescription> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let scene = load_scene_from_str(&source, base_dir)?;

    log::info!(
        "Loaded {}: {} objects ({} triangles), {} lights, {} materials",
        path.display(),
        scene.objects.len(),
        scene.triangle_count(),
        scene.lights.len(),
        scene.materials.len()
    );

    Ok(scene)
}

/// Parse scene commands from memory.
pub fn load_scene_from_str(
    source: &str,
    base_dir: impl Into<PathBuf>,
) -> LoadResult<SceneDescription> {
    Parser::new(source, base_dir)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_scene_resolves_mesh_relative_to_file() {
        let dir = std::env::temp_dir().join(format!("prism_loader_{}", std::process::id()));
        std::fs::create_dir_all(dir.join("meshes")).unwrap();
        std::fs::write(
            dir.join("meshes/tri.obj"),
            "v 0 1 0\nv -1 -1 0\nv 1 -1 0\nf 1 2 3\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("scene.ray"),
            "Material \"m\" \"blinn\" \"\" \"k_diffuse\" 1\n\
             Mesh \"meshes/tri.obj\" \"m\"\n\
             Mesh \"meshes/tri.obj\" \"m\"\n\
             container \"BVH\"\n",
        )
        .unwrap();

        let scene = load_scene(dir.join("scene.ray")).unwrap();

        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.triangle_count(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_scene_missing_file() {
        assert!(matches!(
            load_scene("/definitely/not/here.ray"),
            Err(LoadError::Io(_))
        ));
    }

    #[test]
    fn test_missing_texture_is_error() {
        let result = load_scene_from_str(
            "Material \"m\" \"blinn\" \"missing.png\" \"k_diffuse\" 1",
            "/definitely/not/here",
        );
        assert!(matches!(result, Err(LoadError::Texture(_))));
    }
}
