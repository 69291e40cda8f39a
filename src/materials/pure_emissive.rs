// Copyright @yucwang 2026

use crate::core::intersection::Intersection;
use crate::core::rng::LcgRng;
use crate::math::constants::Vector3f;
use crate::math::ray::Ray3f;

/// Light source surface. Deposits its radiance weighted by the path
/// throughput and terminates the path; emitters do not reflect.
pub struct PureEmissive {
    radiance: Vector3f,
}

impl PureEmissive {
    pub fn new(radiance: Vector3f) -> Self {
        Self { radiance }
    }

    pub fn emitted(&self) -> Vector3f {
        self.radiance
    }

    pub fn sample(&self, _isect: &Intersection, ray: &mut Ray3f,
                  _rng: &mut LcgRng) -> bool {
        ray.radiance += self.radiance.component_mul(&ray.weight);
        false
    }
}
