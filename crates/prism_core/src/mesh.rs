//! Triangle mesh geometry.
//!
//! Meshes are single-indexed: every index addresses the same slot in
//! `positions`, `normals` and `uvs`. OBJ files are loaded through `tobj`
//! and triangulated on the way in.

use std::path::Path;

use prism_math::{Aabb, DVec2, DVec3, MathError};
use thiserror::Error;

/// Twice-area threshold below which a triangle counts as degenerate.
const DEGENERATE_AREA: f64 = 1e-12;

/// Errors raised while loading or validating a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Mesh has no triangles")]
    Empty,

    #[error("Triangle {triangle} references vertex {index}, but mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Triangle {0} has zero area")]
    DegenerateTriangle(usize),

    #[error("Index count {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),
}

pub type MeshResult<T> = Result<T, MeshError>;

/// An indexed triangle mesh in double precision.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Vertex positions
    pub positions: Vec<DVec3>,

    /// Per-vertex normals, same length as `positions` when present
    pub normals: Option<Vec<DVec3>>,

    /// Per-vertex texture coordinates, same length as `positions` when present
    pub uvs: Option<Vec<DVec2>>,

    /// Triangle indices (every 3 indices form a triangle, counter-clockwise)
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(positions: Vec<DVec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: None,
            uvs: None,
            indices,
        }
    }

    pub fn with_normals(mut self, normals: Vec<DVec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<DVec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Load every model of an OBJ file into one mesh.
    pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )?;

        let mut mesh = Mesh::default();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut all_have_normals = true;
        let mut all_have_uvs = true;

        for model in &models {
            let m = &model.mesh;
            let offset = mesh.positions.len() as u32;
            let vertex_count = m.positions.len() / 3;

            mesh.positions.extend(
                m.positions
                    .chunks_exact(3)
                    .map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64)),
            );

            if m.normals.len() == vertex_count * 3 {
                normals.extend(
                    m.normals
                        .chunks_exact(3)
                        .map(|n| DVec3::new(n[0] as f64, n[1] as f64, n[2] as f64)),
                );
            } else {
                all_have_normals = false;
            }

            if m.texcoords.len() == vertex_count * 2 {
                uvs.extend(
                    m.texcoords
                        .chunks_exact(2)
                        .map(|t| DVec2::new(t[0] as f64, t[1] as f64)),
                );
            } else {
                all_have_uvs = false;
            }

            mesh.indices.extend(m.indices.iter().map(|i| i + offset));

            log::debug!(
                "OBJ model '{}': {} vertices, {} triangles",
                model.name,
                vertex_count,
                m.indices.len() / 3
            );
        }

        if all_have_normals && !normals.is_empty() {
            mesh.normals = Some(normals);
        } else {
            log::warn!("{}: no vertex normals, using face normals", path.display());
        }

        if all_have_uvs && !uvs.is_empty() {
            mesh.uvs = Some(uvs);
        } else {
            log::warn!("{}: no texture coordinates, using barycentrics", path.display());
        }

        Ok(mesh)
    }

    /// Check that the mesh is usable for intersection.
    pub fn validate(&self) -> MeshResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices(self.indices.len()));
        }
        if self.indices.is_empty() {
            return Err(MeshError::Empty);
        }

        let vertex_count = self.positions.len();
        for (triangle, face) in self.indices.chunks_exact(3).enumerate() {
            if let Some(&index) = face.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }

            let [a, b, c] = self.triangle(triangle);
            if (b - a).cross(c - a).length() <= DEGENERATE_AREA {
                return Err(MeshError::DegenerateTriangle(triangle));
            }
        }

        Ok(())
    }

    /// Vertex positions of triangle `index`.
    ///
    /// Callers must have validated the mesh.
    pub fn triangle(&self, index: usize) -> [DVec3; 3] {
        let i = index * 3;
        [
            self.positions[self.indices[i] as usize],
            self.positions[self.indices[i + 1] as usize],
            self.positions[self.indices[i + 2] as usize],
        ]
    }

    /// Texture coordinates of triangle `index`, if the mesh carries them.
    pub fn triangle_uvs(&self, index: usize) -> Option<[DVec2; 3]> {
        let uvs = self.uvs.as_ref()?;
        let i = index * 3;
        Some([
            *uvs.get(self.indices[i] as usize)?,
            *uvs.get(self.indices[i + 1] as usize)?,
            *uvs.get(self.indices[i + 2] as usize)?,
        ])
    }

    /// Local-space bounds of all vertices.
    pub fn bounds(&self) -> Result<Aabb, MathError> {
        Aabb::bounds_of(&self.positions)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Mesh {
        Mesh::new(
            vec![
                DVec3::new(0.0, 1.0, 0.0),
                DVec3::new(-1.0, -1.0, 0.0),
                DVec3::new(1.0, -1.0, 0.0),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_validate_ok() {
        let mesh = unit_triangle();
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_validate_empty() {
        let mesh = Mesh::new(vec![DVec3::ZERO], vec![]);
        assert!(matches!(mesh.validate(), Err(MeshError::Empty)));
    }

    #[test]
    fn test_validate_index_out_of_range() {
        let mut mesh = unit_triangle();
        mesh.indices = vec![0, 1, 7];

        match mesh.validate() {
            Err(MeshError::IndexOutOfRange { index, .. }) => assert_eq!(index, 7),
            other => panic!("expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_degenerate() {
        let mesh = Mesh::new(
            vec![DVec3::ZERO, DVec3::X, DVec3::X * 2.0],
            vec![0, 1, 2],
        );
        assert!(matches!(mesh.validate(), Err(MeshError::DegenerateTriangle(0))));
    }

    #[test]
    fn test_bounds() {
        let bounds = unit_triangle().bounds().unwrap();
        assert_eq!(bounds.min(), DVec3::new(-1.0, -1.0, 0.0));
        assert_eq!(bounds.max(), DVec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_triangle_uvs() {
        let mesh = unit_triangle();
        assert!(mesh.triangle_uvs(0).is_none());

        let mesh = mesh.with_uvs(vec![DVec2::new(0.5, 1.0), DVec2::ZERO, DVec2::X]);
        assert_eq!(
            mesh.triangle_uvs(0),
            Some([DVec2::new(0.5, 1.0), DVec2::ZERO, DVec2::X])
        );
    }

    #[test]
    fn test_load_obj_quad_is_triangulated() {
        let dir = std::env::temp_dir().join(format!("prism_mesh_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("quad.obj");
        std::fs::write(
            &file,
            "v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             f 1/1 2/2 3/3 4/4\n",
        )
        .unwrap();

        let mesh = Mesh::load_obj(&file).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.has_uvs());
        assert!(!mesh.has_normals());
        assert!(mesh.validate().is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_obj_missing_file() {
        let result = Mesh::load_obj("/definitely/not/here.obj");
        assert!(matches!(result, Err(MeshError::Obj(_))));
    }
}
