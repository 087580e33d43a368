//! Triangle mesh intersection.
//!
//! Inside-outside test against the triangle's plane, with counter-clockwise
//! winding giving the outward normal. Triangles are scanned linearly; the
//! search window shrinks as nearer triangles are found.

use prism_core::Mesh;
use prism_math::{Aabb, DVec2, DVec3, Interval, MathResult, Ray, EPSILON};

use crate::hittable::LocalHit;

/// Hit on one triangle: parameter and barycentric weights of (a, b, c).
struct TriangleHit {
    t: f64,
    weights: DVec3,
}

/// Nearest triangle of `mesh` hit strictly inside `ray_t`.
pub fn hit_mesh(mesh: &Mesh, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
    let mut window = ray_t;
    let mut nearest: Option<(usize, TriangleHit)> = None;

    for index in 0..mesh.triangle_count() {
        let [a, b, c] = mesh.triangle(index);
        if let Some(hit) = hit_triangle(a, b, c, ray, window) {
            window = window.with_max(hit.t);
            nearest = Some((index, hit));
        }
    }

    let (index, hit) = nearest?;
    let [a, b, c] = mesh.triangle(index);
    let w = hit.weights;

    let face_normal = (b - a).cross(c - a).normalize();
    let normal = smooth_normal(mesh, index, w).unwrap_or(face_normal);

    let uv = match mesh.triangle_uvs(index) {
        Some([ua, ub, uc]) => ua * w.x + ub * w.y + uc * w.z,
        None => DVec2::new(w.y, w.z),
    };

    Some(LocalHit {
        t: hit.t,
        p: a * w.x + b * w.y + c * w.z,
        normal,
        uv,
    })
}

fn hit_triangle(a: DVec3, b: DVec3, c: DVec3, ray: &Ray, ray_t: Interval) -> Option<TriangleHit> {
    let normal = (b - a).cross(c - a);
    let area2 = normal.length_squared();
    if area2 == 0.0 {
        return None;
    }

    // Parallel to the plane
    let n_dot_dir = normal.dot(ray.direction);
    if n_dot_dir.abs() < EPSILON * area2.sqrt() {
        return None;
    }

    let t = normal.dot(a - ray.origin) / n_dot_dir;
    if t < 0.0 || !ray_t.surrounds(t) {
        return None;
    }

    let p = ray.at(t);

    // Same winding for every edge: the point must be on the left of each
    let w_c = (b - a).cross(p - a).dot(normal);
    if w_c < 0.0 {
        return None;
    }
    let w_a = (c - b).cross(p - b).dot(normal);
    if w_a < 0.0 {
        return None;
    }
    let w_b = (a - c).cross(p - c).dot(normal);
    if w_b < 0.0 {
        return None;
    }

    Some(TriangleHit {
        t,
        weights: DVec3::new(w_a, w_b, w_c) / area2,
    })
}

/// Interpolated vertex normal, when the mesh carries usable normals.
fn smooth_normal(mesh: &Mesh, index: usize, weights: DVec3) -> Option<DVec3> {
    let normals = mesh.normals.as_ref()?;
    let i = index * 3;
    let n = *normals.get(mesh.indices[i] as usize)? * weights.x
        + *normals.get(mesh.indices[i + 1] as usize)? * weights.y
        + *normals.get(mesh.indices[i + 2] as usize)? * weights.z;
    n.try_normalize()
}

/// Local bounds of all mesh vertices.
pub fn mesh_bounds(mesh: &Mesh) -> MathResult<Aabb> {
    mesh.bounds()
}
