// Copyright @yucwang 2026

pub mod abraded;
pub mod merl;
pub mod pure_diffuse;
pub mod pure_emissive;

use crate::core::intersection::Intersection;
use crate::core::rng::LcgRng;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;

pub use self::abraded::{ AbradedOpaque, AbradedTranslucent };
pub use self::merl::Merl;
pub use self::pure_diffuse::PureDiffuse;
pub use self::pure_emissive::PureEmissive;

/// The closed set of surface materials. Dispatch is a plain `match`, so a
/// model table stores `Material` values directly and sampling stays free
/// of virtual calls.
pub enum Material {
    PureDiffuse(PureDiffuse),
    AbradedOpaque(AbradedOpaque),
    AbradedTranslucent(AbradedTranslucent),
    Merl(Merl),
    PureEmissive(PureEmissive),
}

impl Material {
    pub fn pure_diffuse(albedo: Vector3f) -> Self {
        Material::PureDiffuse(PureDiffuse::new(albedo))
    }

    pub fn abraded_opaque(albedo: Vector3f, f0: Vector3f,
                          roughness: Float, metalness: Float) -> Self {
        Material::AbradedOpaque(AbradedOpaque::new(albedo, f0, roughness, metalness))
    }

    pub fn abraded_translucent(f0: Vector3f, roughness: Float, ior: Float) -> Self {
        Material::AbradedTranslucent(AbradedTranslucent::new(f0, roughness, ior))
    }

    pub fn merl(merl: Merl) -> Self {
        Material::Merl(merl)
    }

    pub fn pure_emissive(radiance: Vector3f) -> Self {
        Material::PureEmissive(PureEmissive::new(radiance))
    }

    /// Importance-sample the next bounce at `isect`. On survival the ray
    /// is redirected in place, its weight scaled by the BRDF estimate, and
    /// `true` is returned; `false` means the path terminates here (the
    /// sample was absorbed, killed by Russian roulette, or the surface
    /// only emits).
    pub fn sample(&self, isect: &Intersection, ray: &mut Ray3f,
                  rng: &mut LcgRng) -> bool {
        match self {
            Material::PureDiffuse(m) => m.sample(isect, ray, rng),
            Material::AbradedOpaque(m) => m.sample(isect, ray, rng),
            Material::AbradedTranslucent(m) => m.sample(isect, ray, rng),
            Material::Merl(m) => m.sample(isect, ray, rng),
            Material::PureEmissive(m) => m.sample(isect, ray, rng),
        }
    }
}

/// Russian roulette over the mean of the throughput multiplier: survive
/// with probability `mean(multiplier)` and return the compensating scale.
pub(crate) fn russian_roulette(multiplier: &Vector3f, rng: &mut LcgRng) -> Option<Float> {
    let p = (multiplier[0] + multiplier[1] + multiplier[2]) / 3.0;
    if !(p > 0.0) {
        return None;
    }
    let p = p.min(1.0);
    if rng.next_f32() < p {
        Some(1.0 / (p + 1e-5))
    } else {
        None
    }
}

/// Clamp the scalar part of a microfacet estimate. Grazing-angle
/// denominators produce rare huge or non-finite values that show up as
/// single-pixel fireflies; dropping those samples loses far less energy
/// than the variance they carry.
pub(crate) fn clamp_const_term(value: Float) -> Float {
    if !value.is_finite() || value >= 100.0 {
        0.0
    } else {
        value.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::FLOAT_MAX;

    fn sample_once(material: &Material, rng: &mut LcgRng) -> (bool, Ray3f) {
        let mut ray = Ray3f::new(Vector3f::new(0.0, 0.0, 1.0),
                                 Vector3f::new(0.0, 0.0, -1.0), None, None);
        let isect = Intersection::new(Vector3f::zeros(),
                                      Vector3f::new(0.0, 0.0, 1.0), 1.0, 0);
        let survived = material.sample(&isect, &mut ray, rng);
        (survived, ray)
    }

    #[test]
    fn test_emissive_deposits_radiance_and_ends_path() {
        let material = Material::pure_emissive(Vector3f::new(2.0, 4.0, 8.0));
        let mut rng = LcgRng::new(1);

        let mut ray = Ray3f::new(Vector3f::new(0.0, 0.0, 1.0),
                                 Vector3f::new(0.0, 0.0, -1.0), None, None);
        ray.weight = Vector3f::new(0.5, 0.5, 0.25);
        let isect = Intersection::new(Vector3f::zeros(),
                                      Vector3f::new(0.0, 0.0, 1.0), 1.0, 0);
        assert!(!material.sample(&isect, &mut ray, &mut rng));
        assert!((ray.radiance - Vector3f::new(1.0, 2.0, 2.0)).norm() < 1e-5);
    }

    #[test]
    fn test_diffuse_russian_roulette_is_unbiased() {
        // E[weight after sampling] must equal the albedo, up to the 1e-5
        // bias the survival scale carries
        let albedo = Vector3f::new(0.6, 0.3, 0.9);
        let material = Material::pure_diffuse(albedo);
        let mut rng = LcgRng::new(1234);

        let trials = 20000;
        let mut mean = Vector3f::zeros();
        for _ in 0..trials {
            let (survived, ray) = sample_once(&material, &mut rng);
            if survived {
                mean += ray.weight;
            }
        }
        mean /= trials as Float;
        assert!((mean - albedo).norm() < 0.02, "mean weight {:?}", mean);
    }

    #[test]
    fn test_diffuse_samples_stay_in_upper_hemisphere() {
        let material = Material::pure_diffuse(Vector3f::new(0.8, 0.8, 0.8));
        let mut rng = LcgRng::new(77);
        for _ in 0..500 {
            let (survived, ray) = sample_once(&material, &mut rng);
            if survived {
                assert!(ray.dir()[2] > 0.0);
                assert!((ray.dir().norm() - 1.0).abs() < 1e-4);
                assert!(ray.weight[0] <= 1.0 + 1e-4);
            }
        }
    }

    #[test]
    fn test_black_diffuse_always_absorbs() {
        let material = Material::pure_diffuse(Vector3f::zeros());
        let mut rng = LcgRng::new(3);
        for _ in 0..100 {
            let (survived, _) = sample_once(&material, &mut rng);
            assert!(!survived);
        }
    }

    #[test]
    fn test_const_term_clamp() {
        assert_eq!(clamp_const_term(Float::NAN), 0.0);
        assert_eq!(clamp_const_term(Float::INFINITY), 0.0);
        assert_eq!(clamp_const_term(150.0), 0.0);
        assert_eq!(clamp_const_term(-1.0), 0.0);
        assert!((clamp_const_term(3.5) - 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_sampled_ray_range_is_reset_by_integrator_not_material() {
        let material = Material::pure_diffuse(Vector3f::new(1.0, 1.0, 1.0));
        let mut rng = LcgRng::new(9);
        let (_, ray) = sample_once(&material, &mut rng);
        // materials only redirect; the range stays whatever it was
        assert_eq!(ray.min_t, 0.0);
        assert_eq!(ray.max_t, FLOAT_MAX);
    }
}
