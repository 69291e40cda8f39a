// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;

const DEFAULT_FOV_DEGREES: Float = 70.0;

/// Ideal pinhole camera. The horizontal field of view is fixed; the
/// vertical one follows from the film aspect ratio.
pub struct PinholeCamera {
    pos: Vector3f,
    dir: Vector3f,
    fov: Float,
}

impl PinholeCamera {
    /// `fov` is the full horizontal field of view in radians; `None`
    /// picks the 70 degree default.
    pub fn new(pos: Vector3f, dir: Vector3f, fov: Option<Float>) -> Self {
        Self {
            pos,
            dir: dir.normalize(),
            fov: fov.unwrap_or(DEFAULT_FOV_DEGREES.to_radians()),
        }
    }

    pub fn pos(&self) -> Vector3f {
        self.pos
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    /// Primary ray through pixel `(x, y)`, jittered uniformly inside the
    /// pixel footprint. Pixel `(0, 0)` is the top-left corner of the film.
    pub fn generate_jittered_ray(&self, x: usize, y: usize,
                                 width: usize, height: usize,
                                 rng: &mut LcgRng) -> Ray3f {
        // the camera never rolls, so the right vector stays horizontal;
        // a view straight along +-y has no horizontal component to build
        // on, so fall back to the world x axis
        let right = if self.dir.x.abs() < 1e-6 && self.dir.z.abs() < 1e-6 {
            Vector3f::new(1.0, 0.0, 0.0)
        } else {
            Vector3f::new(-self.dir.z, 0.0, self.dir.x).normalize()
        };
        let up = right.cross(&self.dir);

        let half_w = (self.fov / 2.0).tan();
        let half_h = half_w * height as Float / width as Float;

        let u = rng.next_2d();
        let px = ((x as Float + u.x) / (width as Float / 2.0) - 1.0) * half_w;
        let py = (1.0 - (y as Float + u.y) / (height as Float / 2.0)) * half_h;

        let dir = self.dir + right * px + up * py;
        Ray3f::new(self.pos, dir, None, None)
    }
}
