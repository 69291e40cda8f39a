// Copyright 2020 @TwoCookingMice

use super::constants::{ Int, Float, Vector3f,
                       FLOAT_MIN, FLOAT_MAX };
use super::ray::Ray3f;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f
}

impl Default for AABB {
    fn default() -> Self {
        Self { p_min: Vector3f::new(FLOAT_MAX, FLOAT_MAX, FLOAT_MAX),
               p_max: Vector3f::new(FLOAT_MIN, FLOAT_MIN, FLOAT_MIN) }
    }
}

impl AABB {
    pub fn new(p_min: Vector3f, p_max: Vector3f) -> Self {
        let mut min = Vector3f::new(0.0, 0.0, 0.0);
        let mut max = Vector3f::new(0.0, 0.0, 0.0);
        for idx in 0..3 {
            min[idx] = p_min[idx].min(p_max[idx]);
            max[idx] = p_max[idx].max(p_min[idx]);
        }
        Self { p_min: min, p_max: max }
    }

    pub fn center(&self) -> Vector3f {
        0.5f32 * self.p_min + 0.5f32 * self.p_max
    }

    pub fn half_extents(&self) -> Vector3f {
        0.5f32 * (self.p_max - self.p_min)
    }

    pub fn expand_by_point(&mut self, p: &Vector3f) {
        for idx in 0..3 {
            self.p_min[idx] = self.p_min[idx].min(p[idx]);
            self.p_max[idx] = self.p_max[idx].max(p[idx]);
        }
    }

    pub fn expand_by_aabb(&mut self, other: &AABB) {
        for idx in 0..3 {
            self.p_min[idx] = self.p_min[idx].min(other.p_min[idx]);
            self.p_max[idx] = self.p_max[idx].max(other.p_max[idx]);
        }
    }

    // Kay-Kajiya slab method. Divisions are left unguarded on purpose:
    // a zero direction component yields +-inf slab distances and the
    // min/max folding still produces the correct interval under IEEE
    // semantics. The ray hits iff far >= 0 and far >= near.
    pub fn ray_intersect_range(&self, ray: &Ray3f) -> Option<(Float, Float)> {
        if !self.is_valid() {
            return None;
        }

        let o = ray.origin();
        let d = ray.dir();
        let mut t_near = FLOAT_MIN;
        let mut t_far = FLOAT_MAX;

        for idx in 0..3 {
            let inv = 1.0 / d[idx];
            let mut t0 = (self.p_min[idx] - o[idx]) * inv;
            let mut t1 = (self.p_max[idx] - o[idx]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
        }

        if t_far >= 0.0 && t_far >= t_near {
            Some((t_near, t_far))
        } else {
            None
        }
    }

    pub fn ray_intersect(&self, ray: &Ray3f) -> bool {
        self.ray_intersect_range(ray).is_some()
    }

    pub fn surface_area(&self) -> Float {
        let a = self.p_max[0] - self.p_min[0];
        let b = self.p_max[1] - self.p_min[1];
        let c = self.p_max[2] - self.p_min[2];

        2.0f32 * (a*b + a*c + b*c)
    }

    pub fn diagnal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn max_extent(&self) -> Int {
        let diagnal = self.diagnal();
        let ans: Int;
        if diagnal[0] > diagnal[1] && diagnal[0] > diagnal[2] {
            ans = 0;
        } else if diagnal[1] > diagnal[2] {
            ans = 1;
        } else {
            ans = 2;
        }

        ans
    }

    pub fn is_valid(&self) -> bool {
        for idx in 0..3 {
            if self.p_min[idx] > self.p_max[idx] {
                return false;
            }
        }

        true
    }
}

/* Test for AABB */
#[cfg(test)]
mod tests {
    use super::AABB;
    use super::Ray3f;
    use super::Vector3f;
    use crate::core::rng::LcgRng;

    // Six-plane clip oracle: clip [0, t_limit] against each half space.
    fn clip_oracle(bbox: &AABB, ray: &Ray3f) -> bool {
        let mut t0 = 0.0f32;
        let mut t1 = std::f32::MAX;
        let o = ray.origin();
        let d = ray.dir();

        for idx in 0..3 {
            // o + t*d >= p_min and o + t*d <= p_max
            for &(bound, inward) in &[(bbox.p_min[idx], 1.0f32),
                                      (bbox.p_max[idx], -1.0f32)] {
                let num = (bound - o[idx]) * inward;
                let den = d[idx] * inward;
                if den.abs() < 1e-20 {
                    if num > 0.0 {
                        return false;
                    }
                } else if den > 0.0 {
                    t0 = t0.max(num / den);
                } else {
                    t1 = t1.min(num / den);
                }
            }
        }

        t0 <= t1
    }

    #[test]
    fn test_aabb_geometry() {
        let min = Vector3f::new(1.0, 7.0, 3.0);
        let max = Vector3f::new(4.0, 4.0, 4.0);
        let mut bbox: AABB = AABB::new(min, max);

        // new() sorts the corners componentwise
        assert_eq!(bbox.p_min, Vector3f::new(1.0, 4.0, 3.0));
        assert_eq!(bbox.p_max, Vector3f::new(4.0, 7.0, 4.0));

        let center = bbox.center();
        assert!((center[0] - 2.5f32).abs() < 1e-6);
        assert!((center[1] - 5.5f32).abs() < 1e-6);
        assert!((center[2] - 3.5f32).abs() < 1e-6);

        bbox.expand_by_point(&Vector3f::new(-1.0, 5.0, 6.0));
        assert!((bbox.p_min[0] + 1.0f32).abs() < 1e-6);
        assert!((bbox.p_max[2] - 6.0f32).abs() < 1e-6);
        assert_eq!(bbox.max_extent(), 0);

        let mut bbox1: AABB = AABB::default();
        assert!(!bbox1.is_valid());
        bbox1.expand_by_aabb(&bbox);
        assert_eq!(bbox1, bbox);
    }

    #[test]
    fn test_aabb_ray_intersect() {
        let bbox = AABB::new(Vector3f::new(-1.0, -1.0, -1.0),
                             Vector3f::new(1.0, 1.0, 1.0));

        let r1 = Ray3f::new(Vector3f::new(0.0, 0.0, 0.0),
                            Vector3f::new(1.0, 1.0, 1.0), None, None);
        assert_eq!(bbox.ray_intersect(&r1), true);

        // axis-parallel ray: two direction components are exactly zero
        let r2 = Ray3f::new(Vector3f::new(-5.0, 0.0, 0.0),
                            Vector3f::new(1.0, 0.0, 0.0), None, None);
        let (near, far) = bbox.ray_intersect_range(&r2).unwrap();
        assert!((near - 4.0).abs() < 1e-5);
        assert!((far - 6.0).abs() < 1e-5);

        let r3 = Ray3f::new(Vector3f::new(-5.0, 2.0, 0.0),
                            Vector3f::new(1.0, 0.0, 0.0), None, None);
        assert_eq!(bbox.ray_intersect(&r3), false);

        // whole box behind the origin
        let r4 = Ray3f::new(Vector3f::new(5.0, 0.0, 0.0),
                            Vector3f::new(1.0, 0.0, 0.0), None, None);
        assert_eq!(bbox.ray_intersect(&r4), false);
    }

    #[test]
    fn test_aabb_degenerate_box() {
        // zero-volume box is legal and still intersectable head-on
        let bbox = AABB::new(Vector3f::new(0.0, -1.0, -1.0),
                             Vector3f::new(0.0, 1.0, 1.0));
        assert!(bbox.is_valid());

        let r = Ray3f::new(Vector3f::new(-1.0, 0.0, 0.0),
                           Vector3f::new(1.0, 0.0, 0.0), None, None);
        assert_eq!(bbox.ray_intersect(&r), true);
    }

    #[test]
    fn test_aabb_slab_matches_clip_oracle() {
        let mut rng = LcgRng::new(7);
        for _ in 0..2000 {
            let p0 = Vector3f::new(rng.next_f32() * 4.0 - 2.0,
                                   rng.next_f32() * 4.0 - 2.0,
                                   rng.next_f32() * 4.0 - 2.0);
            let p1 = Vector3f::new(rng.next_f32() * 4.0 - 2.0,
                                   rng.next_f32() * 4.0 - 2.0,
                                   rng.next_f32() * 4.0 - 2.0);
            let bbox = AABB::new(p0, p1);

            let o = Vector3f::new(rng.next_f32() * 8.0 - 4.0,
                                  rng.next_f32() * 8.0 - 4.0,
                                  rng.next_f32() * 8.0 - 4.0);
            let mut d = Vector3f::new(rng.next_f32() - 0.5,
                                      rng.next_f32() - 0.5,
                                      rng.next_f32() - 0.5);
            if d.norm() < 1e-3 {
                d = Vector3f::new(1.0, 0.0, 0.0);
            }
            let ray = Ray3f::new(o, d, None, None);

            assert_eq!(bbox.ray_intersect(&ray), clip_oracle(&bbox, &ray));
        }
    }
}
