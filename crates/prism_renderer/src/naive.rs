//! Linear-scan container.

use prism_math::{Aabb, Interval, Ray};

use crate::hittable::{HitRecord, Hittable};
use crate::object::Object;

/// Tests every object in turn, skipping those whose precomputed box the
/// ray misses within the current window.
pub struct NaiveList {
    objects: Vec<Object>,
    boxes: Vec<Aabb>,
    bbox: Aabb,
}

impl NaiveList {
    pub fn new(objects: Vec<Object>) -> Self {
        let boxes: Vec<Aabb> = objects.iter().map(|o| o.bounding_box()).collect();
        let bbox = boxes
            .iter()
            .fold(Aabb::EMPTY, |acc, b| Aabb::surrounding(&acc, b));
        Self {
            objects,
            boxes,
            bbox,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }
}

impl Hittable for NaiveList {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for (object, bbox) in self.objects.iter().zip(&self.boxes) {
            let window = ray_t.with_max(closest_so_far);
            if !bbox.hit(ray, window) {
                continue;
            }
            if object.hit(ray, window, rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::Shape;
    use prism_math::{DMat4, DVec3};

    fn sphere_at(z: f64, material: usize) -> Object {
        Object::new(
            Shape::sphere(1.0),
            DMat4::from_translation(DVec3::new(0.0, 0.0, z)),
            material,
        )
        .unwrap()
    }

    #[test]
    fn test_nearest_hit_regardless_of_order() {
        // Farthest object first in the list
        let list = NaiveList::new(vec![sphere_at(-20.0, 0), sphere_at(-5.0, 1), sphere_at(-10.0, 2)]);
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();

        assert!(list.hit(&ray, Interval::new(1e-6, f64::INFINITY), &mut rec));
        assert!((rec.t - 4.0).abs() < 1e-9);
        assert_eq!(rec.material, 1);
    }

    #[test]
    fn test_window_excludes_nearer_object() {
        let list = NaiveList::new(vec![sphere_at(-5.0, 1), sphere_at(-10.0, 2)]);
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();

        assert!(list.hit(&ray, Interval::new(7.0, f64::INFINITY), &mut rec));
        assert_eq!(rec.material, 2);
    }

    #[test]
    fn test_empty_list() {
        let list = NaiveList::new(Vec::new());
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);
        let mut rec = HitRecord::default();

        assert!(list.is_empty());
        assert!(!list.hit(&ray, Interval::UNIVERSE, &mut rec));
        assert!(list.bounding_box().is_empty());
    }
}
