//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Built once by recursive median split: the split axis cycles X, Y, Z with
//! depth, objects are ordered by the min corner of their boxes on that axis,
//! and each leaf holds exactly one object.

use prism_math::{Aabb, Interval, Ray};

use crate::hittable::{HitRecord, Hittable};
use crate::object::Object;

/// BVH node - a branch with two children or a leaf with one object.
pub enum BvhNode {
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    Leaf {
        /// Index into the owning `Bvh`'s object list
        object: usize,
        bbox: Aabb,
    },
}

impl BvhNode {
    fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }

    fn count(&self) -> usize {
        match self {
            BvhNode::Branch { left, right, .. } => 1 + left.count() + right.count(),
            BvhNode::Leaf { .. } => 1,
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
            BvhNode::Leaf { .. } => 1,
        }
    }
}

/// A BVH owning the objects it indexes.
pub struct Bvh {
    objects: Vec<Object>,
    root: Option<BvhNode>,
}

impl Bvh {
    pub fn new(objects: Vec<Object>) -> Self {
        let mut indices: Vec<usize> = (0..objects.len()).collect();
        let root = if objects.is_empty() {
            None
        } else {
            Some(Self::build(&objects, &mut indices, 0))
        };

        Self { objects, root }
    }

    /// Recursive construction over a non-empty index slice.
    fn build(objects: &[Object], indices: &mut [usize], depth: usize) -> BvhNode {
        if let [object] = *indices {
            return BvhNode::Leaf {
                object,
                bbox: objects[object].bounding_box(),
            };
        }

        let axis = depth % 3;

        // Stable, so ties keep their declaration order
        indices.sort_by(|&a, &b| {
            Aabb::cmp_min(&objects[a].bounding_box(), &objects[b].bounding_box(), axis)
        });

        let mid = indices.len() / 2;
        let (left_indices, right_indices) = indices.split_at_mut(mid);

        let left = Self::build(objects, left_indices, depth + 1);
        let right = Self::build(objects, right_indices, depth + 1);
        let bbox = Aabb::surrounding(left.bbox(), right.bbox());

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
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

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Total number of nodes (branches and leaves).
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, BvhNode::count)
    }

    /// Number of levels, 1 for a single leaf.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, BvhNode::depth)
    }

    /// Depth-first traversal. The caller has already checked `node`'s box.
    fn hit_node(&self, node: &BvhNode, ray: &Ray, ray_t: Interval, rec: &mut HitRecord) -> bool {
        match node {
            BvhNode::Leaf { object, .. } => self.objects[*object].hit(ray, ray_t, rec),

            BvhNode::Branch { left, right, .. } => {
                let left_span = left.bbox().clip(ray, ray_t);
                let right_span = right.bbox().clip(ray, ray_t);

                // Nearer box first
                let (first, second) = match (left_span, right_span) {
                    (None, None) => return false,
                    (Some(_), None) => return self.hit_node(left, ray, ray_t, rec),
                    (None, Some(_)) => return self.hit_node(right, ray, ray_t, rec),
                    (Some(l), Some(r)) if r.min < l.min => (right, left),
                    _ => (left, right),
                };

                let hit_first = self.hit_node(first, ray, ray_t, rec);

                // A box hit is no guarantee of a geometry hit, so the sibling
                // is always considered, within the tightened window
                let window = if hit_first {
                    ray_t.with_max(rec.t)
                } else {
                    ray_t
                };
                let hit_second =
                    second.bbox().hit(ray, window) && self.hit_node(second, ray, window, rec);

                hit_first || hit_second
            }
        }
    }
}

impl Hittable for Bvh {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord) -> bool {
        match &self.root {
            Some(root) if root.bbox().hit(ray, ray_t) => self.hit_node(root, ray, ray_t, rec),
            _ => false,
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.root.as_ref().map_or(Aabb::EMPTY, |root| *root.bbox())
    }
}
