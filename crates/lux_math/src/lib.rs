//! Lux math - value types shared by the renderer crates.
//!
//! Vectors come straight from `glam`; this crate adds the interval, ray and
//! bounding-box types used for ray/scene intersection.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
