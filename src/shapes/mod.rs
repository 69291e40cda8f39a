// Copyright @yucwang 2023

pub mod sphere;
pub mod triangle;
pub mod triangle_mesh;

use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

pub use self::sphere::Sphere;
pub use self::triangle::Triangle;
pub use self::triangle_mesh::TriangleMesh;

/// The closed set of shapes a model can carry.
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
    Triangle(Triangle),
    TriangleMesh(TriangleMesh),
}

/// A non-decomposable primitive as stored in the acceleration structure,
/// tagged with the index of its owning model. Spheres are baked into world
/// space while cooking (a sphere cannot represent a non-uniform scale);
/// triangles stay in model-local space and map the ray through the model
/// transform at intersection time.
#[derive(Debug, Clone)]
pub enum Atomic {
    Sphere { sphere: Sphere, model: usize },
    Triangle { triangle: Triangle, model: usize },
}

impl Shape {
    /// Decompose into atomic primitives, applying `transform` where the
    /// atomic representation requires it.
    pub fn collect_atomics(&self, model: usize, transform: &Transform,
                           out: &mut Vec<Atomic>) {
        match self {
            Shape::Sphere(sphere) => {
                out.push(Atomic::Sphere {
                    sphere: bake_sphere(sphere, transform),
                    model,
                });
            }
            Shape::Triangle(triangle) => {
                out.push(Atomic::Triangle { triangle: triangle.clone(), model });
            }
            Shape::TriangleMesh(mesh) => {
                for triangle in mesh.triangles() {
                    out.push(Atomic::Triangle { triangle: triangle.clone(), model });
                }
            }
        }
    }
}

fn bake_sphere(sphere: &Sphere, transform: &Transform) -> Sphere {
    if transform.is_identity() {
        return sphere.clone();
    }

    let center = transform.apply_point(sphere.center());
    let sx = transform.apply_vector(Vector3f::new(1.0, 0.0, 0.0)).norm();
    let sy = transform.apply_vector(Vector3f::new(0.0, 1.0, 0.0)).norm();
    let sz = transform.apply_vector(Vector3f::new(0.0, 0.0, 1.0)).norm();
    let scale = sx.max(sy).max(sz);

    if (sx - sz).abs() > 1e-4 || (sy - sz).abs() > 1e-4 {
        log::warn!("non-uniform scale on a sphere; using the largest axis factor {}", scale);
    }

    Sphere::new(center, sphere.radius() * scale)
}

impl Atomic {
    pub fn model(&self) -> usize {
        match self {
            Atomic::Sphere { model, .. } => *model,
            Atomic::Triangle { model, .. } => *model,
        }
    }

    pub fn world_aabb(&self, transform: &Transform) -> AABB {
        match self {
            Atomic::Sphere { sphere, .. } => sphere.bounding_box(),
            Atomic::Triangle { triangle, .. } => triangle.world_bounding_box(transform),
        }
    }

    pub fn overlaps_aabb(&self, aabb: &AABB, transform: &Transform) -> bool {
        match self {
            Atomic::Sphere { sphere, .. } => sphere.overlaps_aabb(aabb),
            Atomic::Triangle { triangle, .. } => triangle.overlaps_aabb(aabb, transform),
        }
    }

    /// Closest hit along the world-space ray: (distance, point, shading
    /// normal), all in world space.
    pub fn ray_intersection(&self, ray: &Ray3f, transform: &Transform)
        -> Option<(Float, Vector3f, Vector3f)> {
        match self {
            Atomic::Sphere { sphere, .. } => sphere.ray_intersection(ray),
            Atomic::Triangle { triangle, .. } => triangle.ray_intersection(ray, transform),
        }
    }
}
