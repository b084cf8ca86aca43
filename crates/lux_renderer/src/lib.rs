//! Lux Renderer - CPU Monte Carlo path tracing.
//!
//! The pieces, leaf first:
//!
//! - primitives (sphere, triangle, cylinder, cone) behind the [`Hittable`] trait
//! - an arena [`Bvh`] over those primitives
//! - [`Material`] with one BSDF model per [`Model`] variant
//! - area [`Light`]s that can be sampled for next-event estimation
//! - the path integrator ([`ray_color`])
//! - a striped, multi-threaded driver ([`render`])
//!
//! Every sampling routine takes an explicit random number generator, so a
//! render with a fixed seed is reproducible regardless of thread count.

mod bvh;
mod camera;
mod cone;
mod cylinder;
mod error;
mod hittable;
mod integrator;
mod light;
pub mod material;
pub mod microfacet;
mod primitive;
mod ray;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;
mod stripe;
mod triangle;

pub use bvh::{Bvh, BvhChild, BvhNode, SplitAxis};
pub use camera::Camera;
pub use cone::Cone;
pub use cylinder::Cylinder;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, PrimitiveList, Side};
pub use integrator::{direct_lighting, occluded, ray_color};
pub use light::{DiscLight, Light, LightSample, TriangleLight};
pub use material::{
    DirectionSample, Interface, Material, Medium, Model, PositionSample, SurfacePoint,
    INVALID_PDF,
};
pub use primitive::Primitive;
pub use ray::Ray;
pub use renderer::{render, render_pixel, render_with_cancel, CancelToken, Framebuffer, RenderConfig};
pub use scene::{build_acceleration_structure, Scene, SceneBuilder};
pub use sphere::Sphere;
pub use stripe::{generate_stripes, render_stripe, Stripe};
pub use triangle::Triangle;

pub use lux_core::{Mesh, Texture};
pub use lux_math::{Aabb, Interval, Vec2, Vec3};

/// Linear RGB radiance or reflectance.
pub type Color = Vec3;
