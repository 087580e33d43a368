//! Shapes placed in the world by an affine transform.
//!
//! Rays are mapped into the shape's local space with the inverse transform
//! (direction left unnormalized so `t` is shared by both spaces), and hits
//! are mapped back with the forward and normal matrices.

use prism_core::Shape;
use prism_math::{Aabb, DMat4, Interval, MathResult, Ray, Transform};

use crate::cylinder::{cylinder_bounds, hit_cylinder};
use crate::error::ObjectResult;
use crate::hittable::{HitRecord, Hittable, LocalHit, MaterialId};
use crate::quad::{hit_quad, quad_bounds};
use crate::sphere::{hit_sphere, sphere_bounds};
use crate::triangle::{hit_mesh, mesh_bounds};

/// Minimum thickness of an object's bounding box on any axis.
const MIN_BOX_THICKNESS: f64 = 1e-4;

/// Local-space bounds of a shape.
///
/// Fails only for meshes without vertices.
pub fn local_bounds(shape: &Shape) -> MathResult<Aabb> {
    match shape {
        Shape::Sphere { radius } => Ok(sphere_bounds(*radius)),
        Shape::Quad { half_size } => Ok(quad_bounds(*half_size)),
        Shape::Cylinder {
            radius,
            half_height,
        } => Ok(cylinder_bounds(*radius, *half_height)),
        Shape::Mesh(mesh) => mesh_bounds(mesh),
    }
}

fn intersect_local(shape: &Shape, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
    match shape {
        Shape::Sphere { radius } => hit_sphere(*radius, ray, ray_t),
        Shape::Quad { half_size } => hit_quad(*half_size, ray, ray_t),
        Shape::Cylinder {
            radius,
            half_height,
        } => hit_cylinder(*radius, *half_height, ray, ray_t),
        Shape::Mesh(mesh) => hit_mesh(mesh, ray, ray_t),
    }
}

/// A shape with its transform, material and cached world bounds.
#[derive(Clone, Debug)]
pub struct Object {
    shape: Shape,
    transform: Transform,
    material: MaterialId,
    bbox: Aabb,
}

impl Object {
    /// Fails for a singular transform or a malformed mesh.
    pub fn new(shape: Shape, forward: DMat4, material: MaterialId) -> ObjectResult<Self> {
        // Mesh lookups index vertices directly during traversal
        if let Shape::Mesh(mesh) = &shape {
            mesh.validate()?;
        }

        let transform = Transform::new(forward)?;
        let bbox = Self::world_bounds(&shape, &transform)?;
        Ok(Self {
            shape,
            transform,
            material,
            bbox,
        })
    }

    /// Replace the object-to-world transform. Inverse, normal matrix and
    /// bounds are rederived.
    pub fn set_transform(&mut self, forward: DMat4) -> ObjectResult<()> {
        let mut transform = self.transform;
        transform.set_forward(forward)?;
        self.bbox = Self::world_bounds(&self.shape, &transform)?;
        self.transform = transform;
        Ok(())
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// All 8 local corners go through the forward transform.
    fn world_bounds(shape: &Shape, transform: &Transform) -> MathResult<Aabb> {
        let local = local_bounds(shape)?;
        Ok(transform
            .aabb_to_world(&local)
            .pad_to_minimum(MIN_BOX_THICKNESS))
    }
}

impl Hittable for Object {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord) -> bool {
        let local_ray = self.transform.ray_to_local(ray);
        let Some(hit) = intersect_local(&self.shape, &local_ray, ray_t) else {
            return false;
        };

        rec.t = hit.t;
        rec.p = self.transform.point_to_world(hit.p);
        rec.normal = self.transform.normal_to_world(hit.normal);
        rec.uv = hit.uv;
        rec.material = self.material;
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjectError;
    use prism_core::{Mesh, MeshError};
    use prism_math::{DQuat, DVec3, MathError};

    const WINDOW: Interval = Interval::new(1e-6, f64::INFINITY);

    #[test]
    fn test_translated_sphere() {
        let object = Object::new(
            Shape::sphere(1.0),
            DMat4::from_translation(DVec3::new(0.0, 0.0, -10.0)),
            3,
        )
        .unwrap();

        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();

        assert!(object.hit(&ray, WINDOW, &mut rec));
        assert!((rec.t - 9.0).abs() < 1e-9);
        assert!((rec.p - DVec3::new(0.0, 0.0, -9.0)).length() < 1e-9);
        assert!((rec.normal - DVec3::Z).length() < 1e-9);
        assert_eq!(rec.material, 3);
    }

    #[test]
    fn test_scaled_sphere_keeps_world_t() {
        let object = Object::new(Shape::sphere(1.0), DMat4::from_scale(DVec3::splat(2.0)), 0).unwrap();

        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();

        assert!(object.hit(&ray, WINDOW, &mut rec));
        assert!((rec.t - 3.0).abs() < 1e-9);
        assert!((rec.p - DVec3::new(0.0, 0.0, 2.0)).length() < 1e-9);
    }

    #[test]
    fn test_non_uniform_scale_normal() {
        // Ellipsoid stretched along X; the normal must use the inverse transpose
        let object =
            Object::new(Shape::sphere(1.0), DMat4::from_scale(DVec3::new(4.0, 1.0, 1.0)), 0).unwrap();

        let ray = Ray::new(DVec3::new(2.0, 10.0, 0.0), DVec3::new(0.0, -1.0, 0.0));
        let mut rec = HitRecord::default();
        assert!(object.hit(&ray, WINDOW, &mut rec));

        // Local hit (0.5, sqrt(0.75), 0), local normal equal to it;
        // world normal proportional to (0.5 / 4, sqrt(0.75), 0)
        let expected = DVec3::new(0.125, 0.75f64.sqrt(), 0.0).normalize();
        assert!((rec.normal - expected).length() < 1e-9);
        assert!((rec.normal.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_miss_leaves_record_untouched() {
        let object = Object::new(Shape::quad(1.0), DMat4::IDENTITY, 1).unwrap();
        let ray = Ray::new(DVec3::new(5.0, 0.0, 1.0), DVec3::new(0.0, 0.0, -1.0));

        let mut rec = HitRecord::default();
        rec.material = 42;
        assert!(!object.hit(&ray, WINDOW, &mut rec));
        assert_eq!(rec.material, 42);
        assert!(rec.t.is_infinite());
    }

    #[test]
    fn test_rotated_bounds_use_all_corners() {
        let rotation = DMat4::from_quat(DQuat::from_rotation_y(std::f64::consts::FRAC_PI_4));
        let object = Object::new(Shape::cylinder(1.0, 1.0), rotation, 0).unwrap();

        let extent = 2.0f64.sqrt();
        let bbox = object.bounding_box();
        assert!((bbox.x.max - extent).abs() < 1e-9);
        assert!((bbox.z.min + extent).abs() < 1e-9);
    }

    #[test]
    fn test_flat_quad_bounds_are_padded() {
        let object = Object::new(Shape::quad(1.0), DMat4::IDENTITY, 0).unwrap();
        assert!(object.bounding_box().z.size() > 0.0);
    }

    #[test]
    fn test_set_transform_updates_bounds() {
        let mut object = Object::new(Shape::sphere(1.0), DMat4::IDENTITY, 0).unwrap();
        object
            .set_transform(DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0)))
            .unwrap();

        assert!((object.bounding_box().x.min - 9.0).abs() < 1e-9);

        let ray = Ray::new(DVec3::new(10.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(object.hit(&ray, WINDOW, &mut rec));
    }

    #[test]
    fn test_singular_transform_is_rejected() {
        let result = Object::new(Shape::sphere(1.0), DMat4::from_scale(DVec3::new(1.0, 0.0, 1.0)), 0);
        assert!(matches!(
            result,
            Err(ObjectError::Math(MathError::SingularTransform(_)))
        ));
    }

    #[test]
    fn test_mesh_index_out_of_range_is_rejected() {
        let mesh = Mesh::new(vec![DVec3::ZERO], vec![0, 1, 2]);
        let result = Object::new(Shape::mesh(mesh), DMat4::IDENTITY, 0);

        assert!(matches!(
            result,
            Err(ObjectError::Mesh(MeshError::IndexOutOfRange { index: 1, .. }))
        ));
    }

    #[test]
    fn test_scaled_quad_grazing_hit() {
        // Local direction shrinks with the scale; it must still count as a hit
        let object = Object::new(Shape::quad(1.0), DMat4::from_scale(DVec3::splat(1e7)), 0).unwrap();
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(1.0, 0.0, -1.0));
        let mut rec = HitRecord::default();

        assert!(object.hit(&ray, WINDOW, &mut rec));
        assert!((rec.t - 5.0).abs() < 1e-6);
        assert!((rec.p - DVec3::new(5.0, 0.0, 0.0)).length() < 1e-6);
    }
}
