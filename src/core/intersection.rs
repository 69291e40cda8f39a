// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector3f };

/// Result of a closest-hit query. A plain value: every query produces a
/// fresh one, nothing is reused across primitives. `model` indexes into the
/// scene's model table for material and transform lookup.
#[derive(Debug, Copy, Clone)]
pub struct Intersection {
    pub p: Vector3f,
    pub n: Vector3f,
    pub t: Float,
    pub model: usize,
}

impl Intersection {
    pub fn new(p: Vector3f, n: Vector3f, t: Float, model: usize) -> Self {
        Self { p, n, t, model }
    }
}
