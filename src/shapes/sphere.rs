// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{ EPSILON, Float, Vector3f };
use crate::math::ray::Ray3f;

// Radii much larger than ~1e4 start to show floating point precision
// artefacts on the rendered surface; around 1e3 is fine.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vector3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> Vector3f {
        self.center
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    pub fn bounding_box(&self) -> AABB {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        AABB::new(self.center - r, self.center + r)
    }

    /// Closed-form quadratic solve; returns the nearest root strictly
    /// greater than a small epsilon so a ray starting on the surface does
    /// not re-hit it immediately.
    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<(Float, Vector3f, Vector3f)> {
        let oc = self.center - ray.origin();
        let b = ray.dir().dot(&oc);
        let discriminant = b * b - oc.dot(&oc) + self.radius * self.radius;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let t = if b - sqrt_d > EPSILON {
            b - sqrt_d
        } else if b + sqrt_d > EPSILON {
            b + sqrt_d
        } else {
            return None;
        };

        if !ray.test_segment(t) {
            return None;
        }

        let p = ray.at(t);
        let n = (p - self.center).normalize();
        Some((t, p, n))
    }

    // Jim Arvo's algorithm from Graphics Gems 2: accumulate the squared
    // distance from the sphere center to the box, one clamped slab at a
    // time, and compare against the squared radius.
    pub fn overlaps_aabb(&self, aabb: &AABB) -> bool {
        let mut r_squared = self.radius * self.radius;

        for idx in 0..3 {
            let c = self.center[idx];
            if c < aabb.p_min[idx] {
                r_squared -= (c - aabb.p_min[idx]) * (c - aabb.p_min[idx]);
            } else if c > aabb.p_max[idx] {
                r_squared -= (c - aabb.p_max[idx]) * (c - aabb.p_max[idx]);
            }
        }

        r_squared > 0.0
    }
}
