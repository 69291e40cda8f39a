// Copyright @yucwang 2026

pub mod progressive;

pub use self::progressive::{ ProgressiveRenderer, RenderSession };
