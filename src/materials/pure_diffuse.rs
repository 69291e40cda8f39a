// Copyright @yucwang 2026

use crate::core::intersection::Intersection;
use crate::core::rng::LcgRng;
use crate::math::constants::Vector3f;
use crate::math::ray::Ray3f;
use crate::math::warp::{ local_to_world, orthonormal_basis, sample_cosine_hemisphere };

use super::russian_roulette;

/// Lambertian surface. Cosine-weighted hemisphere sampling makes the
/// throughput multiplier exactly the albedo, so the roulette survival
/// probability is the mean albedo.
pub struct PureDiffuse {
    albedo: Vector3f,
}

impl PureDiffuse {
    pub fn new(albedo: Vector3f) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Vector3f {
        self.albedo
    }

    pub fn sample(&self, isect: &Intersection, ray: &mut Ray3f,
                  rng: &mut LcgRng) -> bool {
        let mut n = isect.n;
        if n.dot(&ray.dir()) > 0.0 {
            n = -n;
        }

        let scale = match russian_roulette(&self.albedo, rng) {
            Some(scale) => scale,
            None => return false,
        };

        let (t, b) = orthonormal_basis(&n);
        let local = sample_cosine_hemisphere(&rng.next_2d());
        ray.set_dir(local_to_world(&local, &t, &b, &n));
        ray.weight = (self.albedo * scale).component_mul(&ray.weight);
        true
    }
}
