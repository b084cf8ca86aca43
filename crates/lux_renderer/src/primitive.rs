//! The closed set of scene primitives.

use crate::hittable::{HitRecord, Hittable};
use crate::{Cone, Cylinder, Ray, Sphere, Triangle};
use lux_math::{Aabb, Interval, Vec2, Vec3};

/// Any shape the BVH can hold.
#[derive(Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
    Cylinder(Cylinder),
    Cone(Cone),
}

impl Hittable for Primitive {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t),
            Primitive::Triangle(t) => t.hit(ray, ray_t),
            Primitive::Cylinder(c) => c.hit(ray, ray_t),
            Primitive::Cone(c) => c.hit(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Triangle(t) => t.bounding_box(),
            Primitive::Cylinder(c) => c.bounding_box(),
            Primitive::Cone(c) => c.bounding_box(),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Triangle> for Primitive {
    fn from(t: Triangle) -> Self {
        Primitive::Triangle(t)
    }
}

impl From<Cylinder> for Primitive {
    fn from(c: Cylinder) -> Self {
        Primitive::Cylinder(c)
    }
}

impl From<Cone> for Primitive {
    fn from(c: Cone) -> Self {
        Primitive::Cone(c)
    }
}

/// A candidate root of a multi-surface shape (side wall or cap).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub t: f32,
    pub outward_normal: Vec3,
    pub uv: Vec2,
}

/// Keep `candidate` if it is in range and nearer than the current best.
pub(crate) fn keep_nearest(best: &mut Option<Candidate>, candidate: Candidate, ray_t: Interval) {
    if !ray_t.surrounds(candidate.t) {
        return;
    }
    if best.map_or(true, |b| candidate.t < b.t) {
        *best = Some(candidate);
    }
}

/// Planar uv for a cap disc of radius `radius` centered at the origin.
pub(crate) fn cap_uv(local: Vec3, radius: f32) -> Vec2 {
    let scale = if radius > 0.0 { 0.5 / radius } else { 0.0 };
    Vec2::new(local.x * scale + 0.5, local.z * scale + 0.5)
}

/// Angle around +Y mapped to [0, 1].
pub(crate) fn azimuth_u(local: Vec3) -> f32 {
    (local.z.atan2(local.x) + std::f32::consts::PI) / std::f32::consts::TAU
}
