// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, FLOAT_MAX};
use crate::math::ray::Ray3f;

const COST_TRAVERSAL: Float = 1.0;
const COST_INTERSECTION: Float = 1.0;

#[derive(Debug)]
enum KdNodeKind {
    Interior {
        axis: usize,
        split: Float,
        // child on the negative / positive side of the split plane;
        // a side that no primitive overlaps has no node at all
        neg: Option<usize>,
        pos: Option<usize>,
    },
    Leaf {
        prims: Vec<usize>,
    },
}

#[derive(Debug)]
struct KdNode {
    bounds: AABB,
    kind: KdNodeKind,
}

/// SAH k-d tree over atomic primitives. Built once when the scene is
/// cooked; immutable afterwards, so traversal needs no locking. Geometry
/// stays outside the tree: primitives are referred to by index and tested
/// through callbacks, the same way the renderer's other spatial queries
/// are decoupled from the shape storage.
pub struct Kdtree {
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct SplitPlane {
    pub axis: usize,
    pub pos: Float,
    pub cost: Float,
}

#[derive(Copy, Clone, PartialEq)]
enum PointKind {
    PrimitiveMin,
    PrimitiveMax,
}

#[derive(Copy, Clone)]
struct TestPoint {
    pos: Float,
    kind: PointKind,
}

fn area_of_extents(e0: Float, e1: Float, e2: Float) -> Float {
    2.0 * (e0 * e1 + e1 * e2 + e2 * e0)
}

/// Sweep the 2N candidate planes of every axis and return the cheapest
/// one under the surface-area heuristic, or `None` when the node extent
/// admits no usable plane. The returned cost is comparable against the
/// no-split cost `COST_INTERSECTION * N`.
pub(crate) fn find_best_split(bounds: &AABB, prims: &[usize],
                              prim_aabbs: &[AABB]) -> Option<SplitPlane> {
    let extents = bounds.diagnal();
    let parent_area = area_of_extents(extents[0], extents[1], extents[2]);
    if !(parent_area > 0.0) || !parent_area.is_finite() {
        return None;
    }

    let mut best: Option<SplitPlane> = None;

    for axis in 0..3 {
        let mut points = Vec::with_capacity(prims.len() * 2);
        for &prim in prims {
            points.push(TestPoint { pos: prim_aabbs[prim].p_min[axis],
                                    kind: PointKind::PrimitiveMin });
            points.push(TestPoint { pos: prim_aabbs[prim].p_max[axis],
                                    kind: PointKind::PrimitiveMax });
        }
        points.sort_by(|a, b| a.pos.partial_cmp(&b.pos)
                              .unwrap_or(std::cmp::Ordering::Equal));

        // running counts of primitives overlapping each side of the
        // sweeping plane; a primitive leaves the positive side only once
        // the plane has moved past its max point
        let mut num_neg = 0usize;
        let mut num_pos = prims.len();
        let mut boundary_passed = false;

        for point in &points {
            match point.kind {
                PointKind::PrimitiveMin => {
                    if boundary_passed {
                        boundary_passed = false;
                        num_pos -= 1;
                    }
                    num_neg += 1;
                }
                PointKind::PrimitiveMax => {
                    if boundary_passed {
                        num_pos -= 1;
                    }
                    boundary_passed = true;
                }
            }

            // a plane on or outside the node boundary cannot split it
            if point.pos <= bounds.p_min[axis] || point.pos >= bounds.p_max[axis] {
                continue;
            }

            let mut pos_extents = extents;
            let mut neg_extents = extents;
            pos_extents[axis] = bounds.p_max[axis] - point.pos;
            neg_extents[axis] = point.pos - bounds.p_min[axis];

            let pos_frac = area_of_extents(pos_extents[0], pos_extents[1], pos_extents[2])
                           / parent_area;
            let neg_frac = area_of_extents(neg_extents[0], neg_extents[1], neg_extents[2])
                           / parent_area;

            let cost = COST_TRAVERSAL + COST_INTERSECTION
                       * (pos_frac * num_pos as Float + neg_frac * num_neg as Float);

            if best.map_or(true, |b| cost < b.cost) {
                best = Some(SplitPlane { axis, pos: point.pos, cost });
            }
        }
    }

    best
}

impl Kdtree {
    /// Build ("cook") the tree from the primitives' world-space bounds.
    /// `overlaps(prim, aabb)` answers whether a primitive's actual
    /// geometry touches a candidate child box; primitives straddling the
    /// split plane are duplicated into both children.
    pub fn build<F>(prim_aabbs: &[AABB], overlaps: F) -> Self
    where
        F: Fn(usize, &AABB) -> bool,
    {
        let mut tree = Self { nodes: Vec::new(), root: None };
        if prim_aabbs.is_empty() {
            return tree;
        }

        let mut bounds = AABB::default();
        for prim_aabb in prim_aabbs {
            bounds.expand_by_aabb(prim_aabb);
        }

        let prims: Vec<usize> = (0..prim_aabbs.len()).collect();
        let root = tree.build_node(bounds, prims, prim_aabbs, &overlaps);
        tree.root = Some(root);
        tree
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bounds(&self) -> Option<AABB> {
        self.root.map(|root| self.nodes[root].bounds)
    }

    fn make_leaf(&mut self, bounds: AABB, prims: Vec<usize>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(KdNode { bounds, kind: KdNodeKind::Leaf { prims } });
        idx
    }

    fn build_node<F>(&mut self, bounds: AABB, prims: Vec<usize>,
                     prim_aabbs: &[AABB], overlaps: &F) -> usize
    where
        F: Fn(usize, &AABB) -> bool,
    {
        let no_split_cost = COST_INTERSECTION * prims.len() as Float;
        let plane = match find_best_split(&bounds, &prims, prim_aabbs) {
            Some(plane) if plane.cost < no_split_cost => plane,
            // no beneficial split: brute-force leaf, by design
            _ => return self.make_leaf(bounds, prims),
        };

        let mut neg_bounds = bounds;
        let mut pos_bounds = bounds;
        neg_bounds.p_max[plane.axis] = plane.pos;
        pos_bounds.p_min[plane.axis] = plane.pos;

        let neg_prims: Vec<usize> = prims.iter().copied()
            .filter(|&prim| overlaps(prim, &neg_bounds)).collect();
        let pos_prims: Vec<usize> = prims.iter().copied()
            .filter(|&prim| overlaps(prim, &pos_bounds)).collect();

        // every primitive straddles the plane: splitting cannot make
        // progress, fall back to a leaf
        if neg_prims.len() == prims.len() && pos_prims.len() == prims.len() {
            return self.make_leaf(bounds, prims);
        }

        let idx = self.nodes.len();
        self.nodes.push(KdNode {
            bounds,
            kind: KdNodeKind::Interior {
                axis: plane.axis,
                split: plane.pos,
                neg: None,
                pos: None,
            },
        });

        let neg = if neg_prims.is_empty() {
            None
        } else {
            Some(self.build_node(neg_bounds, neg_prims, prim_aabbs, overlaps))
        };
        let pos = if pos_prims.is_empty() {
            None
        } else {
            Some(self.build_node(pos_bounds, pos_prims, prim_aabbs, overlaps))
        };

        match &mut self.nodes[idx].kind {
            KdNodeKind::Interior { neg: n, pos: p, .. } => {
                *n = neg;
                *p = pos;
            }
            KdNodeKind::Leaf { .. } => unreachable!(),
        }

        idx
    }

    /// Front-to-back traversal returning the closest hit the callback
    /// reports. `hit_fn(prim, ray)` yields `(value, distance)`; traversal
    /// stops as soon as a confirmed hit lies inside the interval of the
    /// cell being visited, which is what makes visiting the near child
    /// first mandatory.
    pub fn ray_intersection<T, F>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<T>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        let root = self.root?;
        let (near, far) = self.nodes[root].bounds.ray_intersect_range(ray)?;
        let near = near.max(0.0);

        let mut best: Option<(T, Float)> = None;
        self.traverse(root, ray, near, far.min(FLOAT_MAX), &mut hit_fn, &mut best);
        best.map(|(value, _)| value)
    }

    fn traverse<T, F>(&self, idx: usize, ray: &Ray3f, t_min: Float, t_max: Float,
                      hit_fn: &mut F, best: &mut Option<(T, Float)>) -> bool
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        match &self.nodes[idx].kind {
            KdNodeKind::Interior { axis, split, neg, pos } => {
                let origin = ray.origin()[*axis];
                let dir = ray.dir()[*axis];

                let (near_child, far_child) = if *split > origin {
                    (*neg, *pos)
                } else {
                    (*pos, *neg)
                };

                // signed distance to the split plane; +-inf for rays
                // parallel to it, which the interval tests absorb
                let plane_dist = (*split - origin) / dir;

                if plane_dist <= 0.0 || plane_dist >= t_max {
                    // plane behind the ray or beyond its range: the whole
                    // interval lies in the origin-side cell
                    match near_child {
                        Some(child) => self.traverse(child, ray, t_min, t_max, hit_fn, best),
                        None => false,
                    }
                } else if plane_dist <= t_min {
                    // the ray crosses the plane before entering the node,
                    // so the interval lies entirely in the far cell
                    match far_child {
                        Some(child) => self.traverse(child, ray, t_min, t_max, hit_fn, best),
                        None => false,
                    }
                } else {
                    if let Some(child) = near_child {
                        if self.traverse(child, ray, t_min, plane_dist, hit_fn, best) {
                            return true;
                        }
                    }
                    if let Some(child) = far_child {
                        if self.traverse(child, ray, plane_dist, t_max, hit_fn, best) {
                            return true;
                        }
                    }
                    false
                }
            }
            KdNodeKind::Leaf { prims } => {
                for &prim in prims {
                    if let Some((value, t)) = hit_fn(prim, ray) {
                        if best.as_ref().map_or(true, |(_, best_t)| t < *best_t) {
                            *best = Some((value, t));
                        }
                    }
                }

                // a hit inside this cell's interval cannot be beaten by
                // any cell further along the ray
                best.as_ref().map_or(false, |(_, t)| *t <= t_max)
            }
        }
    }
}
