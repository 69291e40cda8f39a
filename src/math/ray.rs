// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

/// A ray together with the running state of the light path it carries:
/// `radiance` accumulates emitted light picked up along the path, `weight`
/// is the path throughput multiplier. Direction and weight are overwritten
/// at every bounce; the ray lives for exactly one pixel sample.
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float,
    pub radiance: Vector3f,
    pub weight: Vector3f,
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(std::f32::MAX),
               radiance: Vector3f::zeros(),
               weight: Vector3f::new(1.0, 1.0, 1.0) }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn set_origin(&mut self, o: Vector3f) {
        self.origin = o;
    }

    pub fn set_dir(&mut self, d: Vector3f) {
        self.dir = d.normalize();
    }

    pub fn reset_range(&mut self, min_t: Float, max_t: Float) {
        self.min_t = min_t;
        self.max_t = max_t;
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }
}

/* Tests for Ray */

#[cfg(test)]
mod tests {
    use super::Ray3f;
    use super::Vector3f;

    #[test]
    fn test_ray3f() {
        let o = Vector3f::new(0.0, 0.0, 0.0);
        let d = Vector3f::new(2.0, 0.0, 0.0);
        let ray = Ray3f::new(o, d, None, None);
        assert_eq!(o, ray.origin());
        assert!((ray.dir().norm() - 1.0).abs() < 1e-6);

        let p = ray.at(3.0);
        assert!((p[0] - 3.0).abs() < 1e-6);

        assert_eq!(ray.test_segment(1.0), true);
        assert_eq!(ray.test_segment(-1.0), false);
    }

    #[test]
    fn test_ray3f_path_state() {
        let mut ray = Ray3f::new(Vector3f::zeros(),
                                 Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert_eq!(ray.radiance, Vector3f::zeros());
        assert_eq!(ray.weight, Vector3f::new(1.0, 1.0, 1.0));

        ray.set_dir(Vector3f::new(0.0, 3.0, 0.0));
        assert!((ray.dir()[1] - 1.0).abs() < 1e-6);

        ray.reset_range(1e-4, 10.0);
        assert_eq!(ray.min_t, 1e-4);
        assert_eq!(ray.max_t, 10.0);
    }
}
