// Copyright @yucwang 2026

use crate::core::intersection::Intersection;
use crate::core::rng::LcgRng;
use crate::math::constants::{ Float, PI, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::{ local_to_world, orthonormal_basis, sample_cosine_hemisphere };

use super::{ clamp_const_term, russian_roulette };

/// Schlick's approximation of the Fresnel reflectance, per channel.
fn fresnel_schlick(f0: &Vector3f, cos_theta: Float) -> Vector3f {
    let c = (1.0 - cos_theta).max(0.0);
    let c5 = c * c * c * c * c;
    f0 + (Vector3f::new(1.0, 1.0, 1.0) - f0) * c5
}

/// Cook-Torrance geometric attenuation (V-cavity shadowing/masking).
fn geometry_term(ho_n: Float, no_v: Float, no_l: Float, vo_h: Float) -> Float {
    let g1 = 2.0 * ho_n * no_v / vo_h;
    let g2 = 2.0 * ho_n * no_l / vo_h;
    g1.min(g2).min(1.0)
}

/// Draw a microfacet half vector around `n` from the Beckmann
/// distribution. The roughness is widened towards grazing view angles,
/// which keeps the weight of samples from the distribution tail bounded.
fn sample_widened_beckmann(v: &Vector3f, n: &Vector3f, roughness: Float,
                           rng: &mut LcgRng) -> Vector3f {
    let alpha = (1.2 - 0.2 * v.dot(n).abs().sqrt()) * roughness;
    let u = rng.next_2d();

    let theta = (-(alpha * alpha) * (1.0 - u.x).ln()).max(0.0).sqrt().atan();
    let phi = 2.0 * PI * u.y;
    let (sin_theta, cos_theta) = theta.sin_cos();

    let local = Vector3f::new(sin_theta * phi.cos(),
                              sin_theta * phi.sin(),
                              cos_theta);
    let (t, b) = orthonormal_basis(n);
    local_to_world(&local, &t, &b, n)
}

fn reflect_about(v: &Vector3f, h: &Vector3f) -> Vector3f {
    h * (2.0 * v.dot(h)) - v
}

fn mean(v: &Vector3f) -> Float {
    (v[0] + v[1] + v[2]) / 3.0
}

/// Rough opaque surface: a Fresnel-weighted Cook-Torrance specular lobe
/// on top of a Lambertian body colour. Metalness scales the body lobe
/// away, since metals have no diffuse component.
pub struct AbradedOpaque {
    albedo: Vector3f,
    f0: Vector3f,
    roughness: Float,
    metalness: Float,
}

impl AbradedOpaque {
    pub fn new(albedo: Vector3f, f0: Vector3f,
               roughness: Float, metalness: Float) -> Self {
        Self { albedo, f0, roughness, metalness }
    }

    pub fn sample(&self, isect: &Intersection, ray: &mut Ray3f,
                  rng: &mut LcgRng) -> bool {
        let v = -ray.dir();
        let mut n = isect.n;
        if n.dot(&v) < 0.0 {
            n = -n;
        }

        let h = sample_widened_beckmann(&v, &n, self.roughness, rng);
        let vo_h = v.dot(&h);
        let f = fresnel_schlick(&self.f0, vo_h.abs());

        // pick a lobe in proportion to the Fresnel weight
        let p_spec = (mean(&f) + 1e-5).min(1.0);

        let (dir, multiplier) = if rng.next_f32() < p_spec {
            let l = reflect_about(&v, &h);
            let no_l = n.dot(&l);
            if no_l <= 0.0 {
                return false;
            }

            let g = geometry_term(h.dot(&n), n.dot(&v), no_l, vo_h);
            let const_term = clamp_const_term(g * l.dot(&h) / (n.dot(&v) * h.dot(&n)));
            (l, f * (const_term / p_spec))
        } else {
            if 1.0 - p_spec <= 0.0 {
                return false;
            }

            let (t, b) = orthonormal_basis(&n);
            let l = local_to_world(&sample_cosine_hemisphere(&rng.next_2d()), &t, &b, &n);
            let body = (Vector3f::new(1.0, 1.0, 1.0) - f).component_mul(&self.albedo)
                       * (1.0 - self.metalness);
            (l, body / (1.0 - p_spec))
        };

        let scale = match russian_roulette(&multiplier, rng) {
            Some(scale) => scale,
            None => return false,
        };

        ray.set_dir(dir);
        ray.weight = (multiplier * scale).component_mul(&ray.weight);
        true
    }
}

/// Rough dielectric that both reflects and transmits. The shading normal
/// keeps its geometric orientation; its sign against the view direction
/// tells whether the ray is entering or leaving the medium.
pub struct AbradedTranslucent {
    f0: Vector3f,
    roughness: Float,
    ior: Float,
}

impl AbradedTranslucent {
    pub fn new(f0: Vector3f, roughness: Float, ior: Float) -> Self {
        Self { f0, roughness, ior }
    }

    pub fn sample(&self, isect: &Intersection, ray: &mut Ray3f,
                  rng: &mut LcgRng) -> bool {
        let v = -ray.dir();
        let n = isect.n;
        let no_v = n.dot(&v);
        let sign = if no_v >= 0.0 { 1.0 } else { -1.0 };

        // half vector lives on the side the view direction comes from
        let h = sample_widened_beckmann(&v, &(n * sign), self.roughness, rng);
        let vo_h = v.dot(&h);
        let f = fresnel_schlick(&self.f0, vo_h.abs());
        let p_refl = (mean(&f) + 1e-5).min(1.0);

        let (dir, multiplier) = if rng.next_f32() < p_refl {
            let l = reflect_about(&v, &h);
            // a reflected ray must stay on the incoming side
            if n.dot(&l) * sign <= 0.0 {
                return false;
            }

            let g = geometry_term(h.dot(&n).abs(), no_v.abs(),
                                  n.dot(&l).abs(), vo_h.abs());
            let const_term = clamp_const_term(
                g * l.dot(&h).abs() / (no_v.abs() * h.dot(&n).abs()));
            (l, f * (const_term / p_refl))
        } else {
            if 1.0 - p_refl <= 0.0 {
                return false;
            }

            let eta = if sign > 0.0 { 1.0 / self.ior } else { self.ior };
            let cos_i = vo_h;
            let sin2_t = eta * eta * (1.0 - cos_i * cos_i);

            let (l, crossed) = if sin2_t >= 1.0 {
                // total internal reflection: the transmission lobe turns
                // into a reflection
                (reflect_about(&v, &h), false)
            } else {
                let cos_t = (1.0 - sin2_t).sqrt();
                (&h * (eta * cos_i - cos_t) - &v * eta, true)
            };

            // transmitted rays must actually cross the surface, total
            // internal reflections must not
            let crossed_sign = if crossed { -sign } else { sign };
            if n.dot(&l) * crossed_sign <= 0.0 {
                return false;
            }

            let g = geometry_term(h.dot(&n).abs(), no_v.abs(),
                                  n.dot(&l).abs(), vo_h.abs());
            let const_term = clamp_const_term(
                g * l.dot(&h).abs() / (no_v.abs() * h.dot(&n).abs()));
            let transmitted = (Vector3f::new(1.0, 1.0, 1.0) - f) * const_term
                              / (1.0 - p_refl);
            (l, transmitted)
        };

        let scale = match russian_roulette(&multiplier, rng) {
            Some(scale) => scale,
            None => return false,
        };

        ray.set_dir(dir.normalize());
        ray.weight = (multiplier * scale).component_mul(&ray.weight);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_hit() -> Intersection {
        Intersection::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), 1.0, 0)
    }

    #[test]
    fn test_smooth_opaque_reflects_like_a_mirror() {
        // zero roughness collapses the half vector onto the normal, so a
        // fully metallic surface must reflect exactly
        let material = AbradedOpaque::new(Vector3f::zeros(),
                                          Vector3f::new(1.0, 1.0, 1.0),
                                          0.0, 1.0);
        let mut rng = LcgRng::new(17);
        let incoming = Vector3f::new(1.0, 0.0, -1.0).normalize();
        let expected = Vector3f::new(1.0, 0.0, 1.0).normalize();

        for _ in 0..50 {
            let mut ray = Ray3f::new(Vector3f::new(-1.0, 0.0, 1.0), incoming, None, None);
            assert!(material.sample(&surface_hit(), &mut ray, &mut rng));
            assert!((ray.dir() - expected).norm() < 1e-4);
            assert!(ray.weight.iter().all(|w| w.is_finite() && *w >= 0.0));
        }
    }

    #[test]
    fn test_opaque_never_scatters_below_the_surface() {
        let material = AbradedOpaque::new(Vector3f::new(0.7, 0.2, 0.2),
                                          Vector3f::new(0.04, 0.04, 0.04),
                                          0.4, 0.0);
        let mut rng = LcgRng::new(23);
        let incoming = Vector3f::new(0.3, 0.2, -1.0).normalize();

        for _ in 0..1000 {
            let mut ray = Ray3f::new(Vector3f::new(0.0, 0.0, 1.0), incoming, None, None);
            if material.sample(&surface_hit(), &mut ray, &mut rng) {
                assert!(ray.dir()[2] > 0.0);
                assert!(ray.weight.iter().all(|w| w.is_finite() && *w >= 0.0));
            }
        }
    }

    #[test]
    fn test_smooth_translucent_refracts_straight_through_at_normal_incidence() {
        let material = AbradedTranslucent::new(Vector3f::new(0.04, 0.04, 0.04),
                                               0.0, 1.5);
        let mut rng = LcgRng::new(29);

        let mut refracted = 0;
        for _ in 0..500 {
            let mut ray = Ray3f::new(Vector3f::new(0.0, 0.0, 1.0),
                                     Vector3f::new(0.0, 0.0, -1.0), None, None);
            if material.sample(&surface_hit(), &mut ray, &mut rng) && ray.dir()[2] < 0.0 {
                refracted += 1;
                // normal incidence through a flat interface does not bend
                assert!((ray.dir() - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-4);
            }
        }
        // reflection probability at normal incidence is only ~4%
        assert!(refracted > 300);
    }

    #[test]
    fn test_translucent_total_internal_reflection() {
        // leaving glass at a grazing angle, well past the ~41.8 degree
        // critical angle: every surviving transmission sample must stay
        // inside the medium
        let material = AbradedTranslucent::new(Vector3f::new(0.04, 0.04, 0.04),
                                               0.0, 1.5);
        let mut rng = LcgRng::new(41);
        let incoming = Vector3f::new(0.9, 0.0, 0.2).normalize();

        let mut survived = 0;
        for _ in 0..500 {
            let mut ray = Ray3f::new(Vector3f::new(0.0, 0.0, -1.0), incoming, None, None);
            if material.sample(&surface_hit(), &mut ray, &mut rng) {
                survived += 1;
                assert!(ray.dir()[2] < 0.0, "ray escaped past the critical angle");
            }
        }
        assert!(survived > 0);
    }
}
