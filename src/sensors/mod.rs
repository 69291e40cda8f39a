// Copyright @yucwang 2026

pub mod pinhole;

pub use self::pinhole::PinholeCamera;
