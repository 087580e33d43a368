//! Surface materials and the table that owns them.

use std::collections::HashMap;
use std::sync::Arc;

use prism_math::{DVec2, DVec3};

use crate::texture::Texture;

/// Local illumination parameters of a surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Key used by objects to reference this material
    pub name: String,

    /// Albedo texture; overrides `color_albedo` when present
    pub texture: Option<Arc<Texture>>,

    /// Flat albedo (RGB, 0-1)
    pub color_albedo: DVec3,

    pub k_ambient: f64,
    pub k_diffuse: f64,
    pub k_specular: f64,

    /// Specular tint: 0 = white dielectric highlight, 1 = albedo-coloured metal
    pub metallic: f64,

    /// Blinn specular exponent
    pub shininess: f64,

    /// Index of refraction (1.0 = surrounding air)
    pub refractive_index: f64,

    /// Weight of the recursively traced reflection ray
    pub k_reflection: f64,

    /// Weight of the recursively traced refraction ray
    pub k_refraction: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            texture: None,
            color_albedo: DVec3::ZERO,
            k_ambient: 0.0,
            k_diffuse: 0.0,
            k_specular: 0.0,
            metallic: 0.0,
            shininess: 0.0,
            refractive_index: 0.0,
            k_reflection: 0.0,
            k_refraction: 0.0,
        }
    }
}

impl Material {
    /// Create a purely diffuse material with a flat colour.
    pub fn new(name: impl Into<String>, color_albedo: DVec3) -> Self {
        Self {
            name: name.into(),
            color_albedo,
            k_diffuse: 1.0,
            ..Default::default()
        }
    }

    /// Albedo at texture coordinates `uv`: the texture sample if one is
    /// bound, otherwise the flat colour.
    pub fn albedo_at(&self, uv: DVec2) -> DVec3 {
        match &self.texture {
            Some(texture) => texture.sample(uv.x, uv.y),
            None => self.color_albedo,
        }
    }

    /// True if any recursive ray can be spawned from this material.
    pub fn is_recursive(&self) -> bool {
        self.k_reflection > 0.0 || self.k_refraction > 0.0
    }
}

/// Materials of a scene, looked up by name.
///
/// Owned by the scene and passed explicitly to whatever needs a lookup.
#[derive(Clone, Debug, Default)]
pub struct MaterialTable {
    materials: HashMap<String, Material>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material under its name, replacing any previous definition.
    pub fn insert(&mut self, material: Material) -> Option<Material> {
        self.materials.insert(material.name.clone(), material)
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_albedo_without_texture() {
        let material = Material::new("red", DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(material.albedo_at(DVec2::new(0.3, 0.7)), DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_texture_overrides_flat_albedo() {
        let material = Material {
            texture: Some(Arc::new(Texture::solid_color(DVec3::new(0.0, 0.5, 1.0)))),
            ..Material::new("tex", DVec3::ONE)
        };
        let albedo = material.albedo_at(DVec2::new(0.5, 0.5));

        assert!((albedo - DVec3::new(0.0, 0.5, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_is_recursive() {
        let mut material = Material::new("m", DVec3::ONE);
        assert!(!material.is_recursive());

        material.k_refraction = 0.5;
        assert!(material.is_recursive());
    }

    #[test]
    fn test_material_table_lookup_and_replace() {
        let mut table = MaterialTable::new();
        assert!(table.is_empty());

        assert!(table.insert(Material::new("a", DVec3::ONE)).is_none());
        let previous = table.insert(Material::new("a", DVec3::ZERO));

        assert_eq!(previous.map(|m| m.color_albedo), Some(DVec3::ONE));
        assert_eq!(table.len(), 1);
        assert!(table.contains("a"));
        assert_eq!(table.get("a").map(|m| m.color_albedo), Some(DVec3::ZERO));
        assert!(table.get("missing").is_none());
    }
}
