//! Validated, intersectable scene.
//!
//! `Scene::build` turns a `SceneDescription` into objects with resolved
//! material ids inside the requested container. Every configuration error
//! is reported here, before a single ray is cast.

use std::collections::HashMap;

use prism_core::{ContainerKind, Material, SceneDescription, SphericalLight};
use prism_math::{Aabb, Camera, DVec3, Interval, Ray, UVec2};

use crate::bvh::Bvh;
use crate::error::{ObjectError, SceneError, SceneResult};
use crate::hittable::{HitRecord, Hittable, MaterialId};
use crate::naive::NaiveList;
use crate::object::Object;

/// Everything the tracer reads. Immutable once built.
pub struct Scene {
    pub resolution: UVec2,
    pub samples_per_pixel: u32,
    pub jitter_radius: f64,
    pub max_ray_depth: u32,
    pub ambient_light: DVec3,
    pub camera: Camera,
    pub lights: Vec<SphericalLight>,
    materials: Vec<Material>,
    container: Box<dyn Hittable>,
    container_kind: ContainerKind,
    object_count: usize,
}

impl Scene {
    /// Build with the container the description asks for.
    pub fn build(description: &SceneDescription) -> SceneResult<Self> {
        Self::build_with_container(description, description.container)
    }

    /// Build with an explicit container strategy.
    pub fn build_with_container(
        description: &SceneDescription,
        container_kind: ContainerKind,
    ) -> SceneResult<Self> {
        validate_settings(description)?;

        // Sorted by name so material ids do not depend on hash order
        let mut materials: Vec<Material> = description.materials.iter().cloned().collect();
        materials.sort_by(|a, b| a.name.cmp(&b.name));
        for material in &materials {
            validate_material(material)?;
        }

        let ids: HashMap<&str, MaterialId> = materials
            .iter()
            .enumerate()
            .map(|(id, m)| (m.name.as_str(), id))
            .collect();

        let mut objects = Vec::with_capacity(description.objects.len());
        for (index, desc) in description.objects.iter().enumerate() {
            let material = ids.get(desc.material.as_str()).copied().ok_or_else(|| {
                SceneError::MissingMaterial {
                    object: index,
                    name: desc.material.clone(),
                }
            })?;

            desc.shape
                .check_dimensions()
                .map_err(|reason| SceneError::InvalidShape {
                    object: index,
                    reason,
                })?;

            let object = Object::new(desc.shape.clone(), desc.transform, material).map_err(
                |error| match error {
                    ObjectError::Mesh(source) => SceneError::Mesh {
                        object: index,
                        source,
                    },
                    ObjectError::Math(source) => SceneError::Math {
                        object: index,
                        source,
                    },
                },
            )?;

            log::debug!(
                "Object {} ({}): bounds {:?} .. {:?}",
                index,
                desc.shape,
                object.bounding_box().min(),
                object.bounding_box().max()
            );
            objects.push(object);
        }

        let object_count = objects.len();
        let container: Box<dyn Hittable> = match container_kind {
            ContainerKind::Bvh => {
                let bvh = Bvh::new(objects);
                log::info!(
                    "Built BVH: {} objects, {} nodes, depth {}",
                    object_count,
                    bvh.node_count(),
                    bvh.depth()
                );
                Box::new(bvh)
            }
            ContainerKind::Naive => {
                log::info!("Built naive container: {} objects", object_count);
                Box::new(NaiveList::new(objects))
            }
        };

        let options = &description.options;
        Ok(Self {
            resolution: options.resolution,
            samples_per_pixel: options.samples_per_pixel,
            jitter_radius: options.jitter_radius,
            max_ray_depth: options.max_ray_depth,
            ambient_light: options.ambient_light,
            camera: description.camera,
            lights: description.lights.clone(),
            materials,
            container,
            container_kind,
            object_count,
        })
    }

    /// Nearest hit strictly inside `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord) -> bool {
        self.container.hit(ray, ray_t, rec)
    }

    /// Material of a hit. Ids come from this scene's objects, so they are
    /// always in range.
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id]
    }

    /// Look up a material id by name.
    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.materials.iter().position(|m| m.name == name)
    }

    pub fn container_kind(&self) -> ContainerKind {
        self.container_kind
    }

    pub fn object_count(&self) -> usize {
        self.object_count
    }

    pub fn bounds(&self) -> Aabb {
        self.container.bounding_box()
    }
}

fn validate_settings(description: &SceneDescription) -> SceneResult<()> {
    let options = &description.options;
    let camera = &description.camera;

    let invalid = |message: String| -> SceneResult<()> { Err(SceneError::InvalidSettings(message)) };

    if options.resolution.x == 0 || options.resolution.y == 0 {
        return invalid(format!(
            "resolution {}x{} has no pixels",
            options.resolution.x, options.resolution.y
        ));
    }
    if options.samples_per_pixel == 0 {
        return invalid("samples_per_pixel must be at least 1".to_string());
    }
    if !(options.jitter_radius.is_finite() && options.jitter_radius >= 0.0) {
        return invalid(format!(
            "jitter_radius must be non-negative, got {}",
            options.jitter_radius
        ));
    }
    if !(camera.fov_y > 0.0 && camera.fov_y < 180.0) {
        return invalid(format!("fovy must be in (0, 180), got {}", camera.fov_y));
    }
    if !(camera.aspect > 0.0) {
        return invalid(format!("aspect must be positive, got {}", camera.aspect));
    }
    if !(camera.z_near >= 0.0 && camera.z_near < camera.z_far) {
        return invalid(format!(
            "clip range [{}, {}] is empty",
            camera.z_near, camera.z_far
        ));
    }

    let forward = camera.center - camera.position;
    if forward.length_squared() == 0.0 || forward.cross(camera.up).length_squared() == 0.0 {
        return invalid("camera up vector is parallel to the view direction".to_string());
    }

    Ok(())
}

fn validate_material(material: &Material) -> SceneResult<()> {
    if material.k_refraction > 0.0 && material.refractive_index <= 0.0 {
        return Err(SceneError::InvalidMaterial {
            name: material.name.clone(),
            reason: format!(
                "k_refraction {} needs a positive refractive_index, got {}",
                material.k_refraction, material.refractive_index
            ),
        });
    }
    if material.shininess < 0.0 {
        return Err(SceneError::InvalidMaterial {
            name: material.name.clone(),
            reason: format!("shininess must be non-negative, got {}", material.shininess),
        });
    }
    Ok(())
}
