use std::cmp::Ordering;

use crate::{DVec3, Interval, MathError, MathResult, Ray};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// The empty box has every interval set to `Interval::EMPTY`
/// (min = +inf, max = -inf) and is the identity for `surrounding`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    /// Create an AABB from two opposite corner points, in any order.
    pub fn from_points(a: DVec3, b: DVec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            x: Interval::new(min.x, max.x),
            y: Interval::new(min.y, max.y),
            z: Interval::new(min.z, max.z),
        }
    }

    /// Smallest box enclosing every point of a non-empty set.
    pub fn bounds_of(points: &[DVec3]) -> MathResult<Self> {
        let (first, rest) = points.split_first().ok_or(MathError::EmptyPointSet)?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Ok(Self::from_points(min, max))
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> DVec3 {
        DVec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> DVec3 {
        DVec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// True if the box contains no point on at least one axis.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Grow every axis thinner than `delta` to `delta`, keeping it centred.
    pub fn pad_to_minimum(&self, delta: f64) -> Self {
        let pad = |i: Interval| {
            if i.size() >= delta {
                i
            } else {
                let mid = 0.5 * (i.min + i.max);
                Interval::new(mid - 0.5 * delta, mid + 0.5 * delta)
            }
        };
        Self::new(pad(self.x), pad(self.y), pad(self.z))
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// The 8 corners, enumerated by binary counting over (x, y, z):
    /// bit 0 selects max x, bit 1 max y, bit 2 max z.
    pub fn corners(&self) -> [DVec3; 8] {
        let (lo, hi) = (self.min(), self.max());
        std::array::from_fn(|i| {
            DVec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        })
    }

    /// Portion of `ray_t` during which the ray is inside the box.
    ///
    /// Slab method: each axis clips the running interval, which starts as
    /// the caller's window. Returns `None` as soon as the interval empties.
    /// A zero direction component divides to +-inf, so a ray parallel to a
    /// slab is either unconstrained by it or rejected outright.
    pub fn clip(&self, r: &Ray, mut ray_t: Interval) -> Option<Interval> {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let orig = r.origin[axis];

            let mut t0 = (slab.min - orig) * adinv;
            let mut t1 = (slab.max - orig) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            // f64::max/min drop a NaN operand (origin on a slab plane with a
            // zero direction component), leaving the window unconstrained.
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.is_empty() {
                return None;
            }
        }

        Some(ray_t)
    }

    /// Test if a ray intersects this AABB within the given interval.
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        self.clip(r, ray_t).is_some()
    }

    /// Ordering predicate used to sort boxes during BVH construction:
    /// `a.min[axis] < b.min[axis]`.
    pub fn compare(a: &Aabb, b: &Aabb, axis: usize) -> bool {
        a.axis_interval(axis).min < b.axis_interval(axis).min
    }

    /// `compare` as an `Ordering` for `sort_by`. Ties (and NaN) compare equal,
    /// so a stable sort keeps their original order.
    pub fn cmp_min(a: &Aabb, b: &Aabb, axis: usize) -> Ordering {
        a.axis_interval(axis)
            .min
            .partial_cmp(&b.axis_interval(axis).min)
            .unwrap_or(Ordering::Equal)
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}
