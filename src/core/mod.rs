// Copyright @yucwang 2026

pub mod accumulator;
pub mod intersection;
pub mod kdtree;
pub mod rng;
pub mod scene;
