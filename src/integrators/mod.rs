// Copyright @yucwang 2026

pub mod path;

pub use self::path::PathTracer;
