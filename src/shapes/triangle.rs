// Copyright @yucwang 2023

use crate::math::aabb::AABB;
use crate::math::constants::{ EPSILON, Float, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// Triangle in model-local space with per-vertex shading normals.
/// Edge vectors and the face normal are precomputed at construction.
/// Front facing: CCW vertex order.
#[derive(Debug, Clone)]
pub struct Triangle {
    v_a: Vector3f,
    v_b: Vector3f,
    v_c: Vector3f,

    n_a: Vector3f,
    n_b: Vector3f,
    n_c: Vector3f,

    e_ab: Vector3f,
    e_ac: Vector3f,

    normal: Vector3f,
}

impl Triangle {
    pub fn new(v_a: Vector3f, v_b: Vector3f, v_c: Vector3f) -> Self {
        let e_ab = v_b - v_a;
        let e_ac = v_c - v_a;
        let normal = e_ab.cross(&e_ac).normalize();

        Self { v_a, v_b, v_c,
               n_a: normal, n_b: normal, n_c: normal,
               e_ab, e_ac, normal }
    }

    pub fn with_normals(mut self, n_a: Vector3f, n_b: Vector3f, n_c: Vector3f) -> Self {
        self.n_a = n_a.normalize();
        self.n_b = n_b.normalize();
        self.n_c = n_c.normalize();
        self
    }

    pub fn vertices(&self) -> (Vector3f, Vector3f, Vector3f) {
        (self.v_a, self.v_b, self.v_c)
    }

    pub fn face_normal(&self) -> Vector3f {
        self.normal
    }

    pub fn bounding_box(&self) -> AABB {
        let mut bound = AABB::new(self.v_a, self.v_b);
        bound.expand_by_point(&self.v_c);
        bound
    }

    pub fn world_bounding_box(&self, transform: &Transform) -> AABB {
        let mut bound = AABB::new(transform.apply_point(self.v_a),
                                  transform.apply_point(self.v_b));
        bound.expand_by_point(&transform.apply_point(self.v_c));
        bound
    }

    // Ingo Wald's method: plane-distance test, then barycentric rejection
    // in a 2D projection along the dominant axis of the face normal.
    pub fn ray_intersection(&self, ray: &Ray3f, transform: &Transform)
        -> Option<(Float, Vector3f, Vector3f)> {
        let local_ray = transform.inv_apply_ray(ray);
        let o = local_ray.origin();
        let d = local_ray.dir();

        let dist = (self.v_a - o).dot(&self.normal) / d.dot(&self.normal);

        // rejects parallel rays (inf) and degenerate triangles (NaN) too
        if !(dist > EPSILON) || !dist.is_finite() {
            return None;
        }

        // project the hit point and both edges along the dominant axis
        let (hit_pu, hit_pv, ab_pu, ab_pv, ac_pu, ac_pv);
        let an = Vector3f::new(self.normal.x.abs(),
                               self.normal.y.abs(),
                               self.normal.z.abs());
        if an.x > an.y && an.x > an.z {
            // X dominant, projection plane is YZ
            hit_pu = dist * d.y + o.y - self.v_a.y;
            hit_pv = dist * d.z + o.z - self.v_a.z;
            ab_pu = self.e_ab.y;
            ab_pv = self.e_ab.z;
            ac_pu = self.e_ac.y;
            ac_pv = self.e_ac.z;
        } else if an.y > an.z {
            // Y dominant, projection plane is ZX
            hit_pu = dist * d.z + o.z - self.v_a.z;
            hit_pv = dist * d.x + o.x - self.v_a.x;
            ab_pu = self.e_ab.z;
            ab_pv = self.e_ab.x;
            ac_pu = self.e_ac.z;
            ac_pv = self.e_ac.x;
        } else {
            // Z dominant, projection plane is XY
            hit_pu = dist * d.x + o.x - self.v_a.x;
            hit_pv = dist * d.y + o.y - self.v_a.y;
            ab_pu = self.e_ab.x;
            ab_pv = self.e_ab.y;
            ac_pu = self.e_ac.x;
            ac_pv = self.e_ac.y;
        }

        let bary_b = (hit_pu * ac_pv - hit_pv * ac_pu) / (ab_pu * ac_pv - ab_pv * ac_pu);
        if !(bary_b >= 0.0) {
            return None;
        }

        let bary_c = (hit_pu * ab_pv - hit_pv * ab_pu) / (ac_pu * ab_pv - ab_pu * ac_pv);
        if !(bary_c >= 0.0) {
            return None;
        }

        if bary_b + bary_c > 1.0 {
            return None;
        }

        let local_p = o + d * dist;
        let local_n = (self.n_a * (1.0 - bary_b - bary_c)
                       + self.n_b * bary_b
                       + self.n_c * bary_c).normalize();

        let world_p = transform.apply_point(local_p);
        let world_n = transform.apply_normal(local_n).normalize();
        let world_t = (world_p - ray.origin()).dot(&ray.dir());

        if !ray.test_segment(world_t) {
            return None;
        }

        Some((world_t, world_p, world_n))
    }

    // Separating-axis triangle/box overlap (Tomas Akenine-Moeller's "Fast
    // 3D Triangle-Box Overlap Testing"): 3 box face normals, the triangle
    // face normal, and 9 edge cross products. Any separating axis found
    // proves no overlap.
    pub fn overlaps_aabb(&self, aabb: &AABB, transform: &Transform) -> bool {
        let center = aabb.center();
        let h = aabb.half_extents();

        // triangle vertices relative to the box center
        let a = transform.apply_point(self.v_a) - center;
        let b = transform.apply_point(self.v_b) - center;
        let c = transform.apply_point(self.v_c) - center;

        // box face normals
        for idx in 0..3 {
            let lo = a[idx].min(b[idx]).min(c[idx]);
            let hi = a[idx].max(b[idx]).max(c[idx]);
            if hi < -h[idx] || lo > h[idx] {
                return false;
            }
        }

        // triangle face normal
        let n = transform.apply_normal(self.normal).normalize();
        let offset = a.dot(&n);
        let box_r = h.x * n.x.abs() + h.y * n.y.abs() + h.z * n.z.abs();
        if offset > box_r || offset < -box_r {
            return false;
        }

        // 9 edge cross products
        let verts = [a, b, c];
        let edges = [b - a, c - b, a - c];
        for (e_idx, edge) in edges.iter().enumerate() {
            for axis_idx in 0..3 {
                let mut unit = Vector3f::zeros();
                unit[axis_idx] = 1.0;
                let axis = unit.cross(edge);

                let r = h.x * axis.x.abs() + h.y * axis.y.abs() + h.z * axis.z.abs();
                // the two edge endpoints project identically; test one
                // endpoint and the opposite vertex
                let p0 = verts[e_idx].dot(&axis);
                let p1 = verts[(e_idx + 2) % 3].dot(&axis);
                if p0.min(p1) > r || p0.max(p1) < -r {
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;

    fn unit_triangle() -> Triangle {
        Triangle::new(Vector3f::new(0.0, 0.0, 0.0),
                      Vector3f::new(1.0, 0.0, 0.0),
                      Vector3f::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn test_triangle_bounding_box() {
        let tri = Triangle::new(Vector3f::new(1.0, 1.0, 1.0),
                                Vector3f::new(1.5, 4.0, -1.0),
                                Vector3f::new(-1.0, 2.0, 2.5));
        let bound = tri.bounding_box();
        assert_eq!(bound.p_min, Vector3f::new(-1.0, 1.0, -1.0));
        assert_eq!(bound.p_max, Vector3f::new(1.5, 4.0, 2.5));
    }

    #[test]
    fn test_triangle_ray_intersection() {
        let tri = unit_triangle();
        let identity = Transform::default();

        let hit = Ray3f::new(Vector3f::new(0.25, 0.25, 1.0),
                             Vector3f::new(0.0, 0.0, -1.0), None, None);
        let (t, p, n) = tri.ray_intersection(&hit, &identity).unwrap();
        assert!((t - 1.0).abs() < 1e-5);
        assert!(p.z.abs() < 1e-5);
        assert!((n.z.abs() - 1.0).abs() < 1e-5);

        // outside the barycentric range
        let miss = Ray3f::new(Vector3f::new(0.9, 0.9, 1.0),
                              Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(tri.ray_intersection(&miss, &identity).is_none());

        // parallel to the plane
        let parallel = Ray3f::new(Vector3f::new(0.0, 0.0, 1.0),
                                  Vector3f::new(1.0, 0.0, 0.0), None, None);
        assert!(tri.ray_intersection(&parallel, &identity).is_none());
    }

    #[test]
    fn test_triangle_hit_point_barycentric_property() {
        // any reported hit must lie in the triangle's plane with valid
        // barycentric coordinates
        let tri = Triangle::new(Vector3f::new(-1.0, -0.5, 2.0),
                                Vector3f::new(1.5, 0.0, 1.5),
                                Vector3f::new(0.0, 2.0, 2.5));
        let identity = Transform::default();
        let (v_a, v_b, v_c) = tri.vertices();
        let n = tri.face_normal();
        let mut rng = LcgRng::new(3);

        let mut hits = 0;
        for _ in 0..1000 {
            let o = Vector3f::new(rng.next_f32() * 2.0 - 1.0,
                                  rng.next_f32() * 2.0 - 1.0,
                                  -1.0);
            let target = Vector3f::new(rng.next_f32() * 3.0 - 1.5,
                                       rng.next_f32() * 3.0 - 1.0,
                                       2.0);
            let ray = Ray3f::new(o, target - o, None, None);

            if let Some((t, p, _)) = tri.ray_intersection(&ray, &identity) {
                hits += 1;
                let on_ray = ray.at(t);
                assert!((on_ray - p).norm() < 1e-3);
                assert!((p - v_a).dot(&n).abs() < 1e-3);

                // solve for barycentrics with the classic dot-product form
                let v0 = v_b - v_a;
                let v1 = v_c - v_a;
                let v2 = p - v_a;
                let d00 = v0.dot(&v0);
                let d01 = v0.dot(&v1);
                let d11 = v1.dot(&v1);
                let d20 = v2.dot(&v0);
                let d21 = v2.dot(&v1);
                let denom = d00 * d11 - d01 * d01;
                let bv = (d11 * d20 - d01 * d21) / denom;
                let bw = (d00 * d21 - d01 * d20) / denom;
                assert!(bv >= -1e-3 && bw >= -1e-3 && bv + bw <= 1.0 + 1e-3);
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn test_triangle_transformed_intersection() {
        let tri = unit_triangle();
        let transform = Transform::translate(Vector3f::new(0.0, 0.0, -3.0));

        let ray = Ray3f::new(Vector3f::new(0.25, 0.25, 0.0),
                             Vector3f::new(0.0, 0.0, -1.0), None, None);
        let (t, p, _) = tri.ray_intersection(&ray, &transform).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
        assert!((p.z + 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_interpolated_normal() {
        let tri = unit_triangle().with_normals(
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(1.0, 0.0, 1.0).normalize(),
            Vector3f::new(0.0, 1.0, 1.0).normalize());
        let identity = Transform::default();

        // hit near vertex B: shading normal leans towards B's normal
        let ray = Ray3f::new(Vector3f::new(0.9, 0.05, 1.0),
                             Vector3f::new(0.0, 0.0, -1.0), None, None);
        let (_, _, n) = tri.ray_intersection(&ray, &identity).unwrap();
        assert!(n.x > 0.5);
    }

    #[test]
    fn test_triangle_aabb_overlap() {
        let tri = unit_triangle();
        let identity = Transform::default();

        let around = AABB::new(Vector3f::new(-0.1, -0.1, -0.1),
                               Vector3f::new(1.1, 1.1, 0.1));
        assert!(tri.overlaps_aabb(&around, &identity));

        let off_plane = AABB::new(Vector3f::new(0.0, 0.0, 1.0),
                                  Vector3f::new(1.0, 1.0, 2.0));
        assert!(!tri.overlaps_aabb(&off_plane, &identity));

        // box beyond the hypotenuse: face-normal and axis tests pass in
        // projection, only an edge cross product separates it
        let past_edge = AABB::new(Vector3f::new(0.8, 0.8, -0.5),
                                  Vector3f::new(1.5, 1.5, 0.5));
        assert!(!tri.overlaps_aabb(&past_edge, &identity));
    }
}
