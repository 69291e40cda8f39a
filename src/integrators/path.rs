// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{ EPSILON, FLOAT_MAX, RAY_OFFSET };

const DEFAULT_MAX_BOUNCES: u32 = 64;

/// Unidirectional path tracer. Each pixel sample walks one light path:
/// trace, let the material redirect the ray and scale its throughput,
/// repeat until the path escapes, gets absorbed, or hits the bounce cap.
/// Russian roulette ends almost every path long before the cap; the cap
/// only fences off pathological mirror corridors.
pub struct PathTracer {
    max_bounces: u32,
}

impl Default for PathTracer {
    fn default() -> Self {
        Self { max_bounces: DEFAULT_MAX_BOUNCES }
    }
}

impl PathTracer {
    pub fn new(max_bounces: u32) -> Self {
        Self { max_bounces }
    }

    /// Render one full-image sample: a single jittered path per pixel.
    pub fn trace_frame(&self, scene: &Scene, frame: &mut Bitmap, rng: &mut LcgRng) {
        let width = frame.width();
        let height = frame.height();

        for y in 0..height {
            for x in 0..width {
                let mut ray = scene.camera.generate_jittered_ray(x, y, width, height, rng);

                for _ in 0..self.max_bounces {
                    ray.reset_range(EPSILON, FLOAT_MAX);
                    let isect = match scene.ray_intersection(&ray) {
                        Some(isect) => isect,
                        None => break,
                    };

                    if !scene.material(isect.model).sample(&isect, &mut ray, rng) {
                        break;
                    }

                    // nudge the origin along the new direction so the
                    // next trace does not re-hit the surface it left
                    ray.set_origin(isect.p + ray.dir() * RAY_OFFSET);
                }

                frame[(x, y)] = ray.radiance;
            }
        }
    }
}
