// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::intersection::Intersection;
use crate::core::kdtree::Kdtree;
use crate::materials::Material;
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;
use crate::sensors::PinholeCamera;
use crate::shapes::{ Atomic, Shape };

/// One shape instance placed in the world: geometry, surface material and
/// the local-to-world transform.
pub struct Model {
    pub shape: Shape,
    pub material: Arc<Material>,
    pub transform: Transform,
}

impl Model {
    pub fn new(shape: Shape, material: Arc<Material>, transform: Transform) -> Self {
        Self { shape, material, transform }
    }
}

/// The world as seen by the integrator. Models are added first, then the
/// scene is cooked exactly once: cooking decomposes every shape into
/// atomic primitives and builds the k-d tree over them. After cooking the
/// scene is immutable and safe to share across render workers.
pub struct Scene {
    models: Vec<Model>,
    atomics: Vec<Atomic>,
    kdtree: Option<Kdtree>,
    pub camera: PinholeCamera,
}

impl Scene {
    pub fn new(camera: PinholeCamera) -> Self {
        Self {
            models: Vec::new(),
            atomics: Vec::new(),
            kdtree: None,
            camera,
        }
    }

    pub fn add_model(&mut self, model: Model) {
        self.models.push(model);
    }

    pub fn material(&self, model: usize) -> &Material {
        &self.models[model].material
    }

    pub fn cook(&mut self) {
        self.atomics.clear();
        for (idx, model) in self.models.iter().enumerate() {
            model.shape.collect_atomics(idx, &model.transform, &mut self.atomics);
        }

        let aabbs: Vec<_> = self.atomics.iter()
            .map(|atomic| atomic.world_aabb(self.transform_of(atomic)))
            .collect();

        let atomics = &self.atomics;
        let models = &self.models;
        let kdtree = Kdtree::build(&aabbs, |prim, aabb| {
            let atomic = &atomics[prim];
            atomic.overlaps_aabb(aabb, &models[atomic.model()].transform)
        });

        log::info!("scene cooked: {} models, {} atomic primitives, {} k-d tree nodes",
                   self.models.len(), self.atomics.len(), kdtree.node_count());
        self.kdtree = Some(kdtree);
    }

    fn transform_of(&self, atomic: &Atomic) -> &Transform {
        &self.models[atomic.model()].transform
    }

    /// Closest intersection along the ray, or `None` if it escapes.
    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<Intersection> {
        match &self.kdtree {
            Some(kdtree) => kdtree.ray_intersection(ray, |prim, ray| {
                let atomic = &self.atomics[prim];
                atomic.ray_intersection(ray, self.transform_of(atomic))
                      .map(|(t, p, n)| {
                          (Intersection::new(p, n, t, atomic.model()), t)
                      })
            }),
            None => self.ray_intersection_brute_force(ray),
        }
    }

    /// Linear scan over every atomic primitive. Kept as the reference
    /// answer the k-d tree is checked against.
    pub fn ray_intersection_brute_force(&self, ray: &Ray3f) -> Option<Intersection> {
        let mut best: Option<Intersection> = None;
        for atomic in &self.atomics {
            if let Some((t, p, n)) = atomic.ray_intersection(ray, self.transform_of(atomic)) {
                if best.as_ref().map_or(true, |hit| t < hit.t) {
                    best = Some(Intersection::new(p, n, t, atomic.model()));
                }
            }
        }
        best
    }
}
