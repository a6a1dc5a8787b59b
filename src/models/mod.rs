//! Data models for Window Templates

pub mod geometry;
pub mod normalized_rect;
pub mod preset;
pub mod target;

pub use geometry::*;
pub use normalized_rect::*;
pub use preset::*;
pub use target::*;
