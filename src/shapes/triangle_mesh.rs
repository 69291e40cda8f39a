// Copyright @yucwang 2023

use crate::math::aabb::AABB;
use crate::math::transform::Transform;

use super::triangle::Triangle;

/// Aggregate of triangles sharing one model transform. The mesh itself is
/// never intersected directly; cooking decomposes it into its triangles.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn world_bounding_box(&self, transform: &Transform) -> AABB {
        let mut bound = AABB::default();
        for triangle in &self.triangles {
            bound.expand_by_aabb(&triangle.world_bounding_box(transform));
        }
        bound
    }
}
