//! Area lights sampled by next-event estimation.

use lux_math::Vec3;
use rand::RngCore;

use crate::sampling::{gen_f32, sample_unit_disc, Frame};
use crate::Color;

/// A point drawn uniformly on a light's surface.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub point: Vec3,
    pub radiance: Color,
    /// Unit normal on the emitting side
    pub normal: Vec3,
    /// Area density, `1 / area`
    pub pdf: f32,
}

/// One-sided emitting disc.
#[derive(Debug, Clone, Copy)]
pub struct DiscLight {
    pub center: Vec3,
    pub normal: Vec3,
    pub radius: f32,
    pub radiance: Color,
}

impl DiscLight {
    pub fn new(center: Vec3, normal: Vec3, radius: f32, radiance: Color) -> Self {
        Self {
            center,
            normal: normal.try_normalize().unwrap_or(Vec3::Y),
            radius: radius.abs(),
            radiance,
        }
    }

    pub fn area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius
    }

    fn sample_p(&self, rng: &mut dyn RngCore) -> LightSample {
        let d = sample_unit_disc(rng) * self.radius;
        let frame = Frame::from_normal(self.normal);
        LightSample {
            point: self.center + frame.x * d.x + frame.y * d.y,
            radiance: self.radiance,
            normal: self.normal,
            pdf: 1.0 / self.area(),
        }
    }
}

/// One-sided emitting triangle. The normal follows the winding order.
#[derive(Debug, Clone, Copy)]
pub struct TriangleLight {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub radiance: Color,
}

impl TriangleLight {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, radiance: Color) -> Self {
        Self { v0, v1, v2, radiance }
    }

    pub fn normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(self.v2 - self.v0).normalize_or_zero()
    }

    pub fn area(&self) -> f32 {
        0.5 * (self.v1 - self.v0).cross(self.v2 - self.v0).length()
    }

    fn sample_p(&self, rng: &mut dyn RngCore) -> LightSample {
        let mut u = gen_f32(rng);
        let mut v = gen_f32(rng);
        // Fold the far half of the parallelogram back onto the triangle
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        LightSample {
            point: self.v0 + u * (self.v1 - self.v0) + v * (self.v2 - self.v0),
            radiance: self.radiance,
            normal: self.normal(),
            pdf: 1.0 / self.area(),
        }
    }
}

/// The closed set of light shapes.
#[derive(Debug, Clone, Copy)]
pub enum Light {
    Disc(DiscLight),
    Triangle(TriangleLight),
}

impl Light {
    /// Uniformly sample a point on the light.
    pub fn sample_p(&self, rng: &mut dyn RngCore) -> LightSample {
        match self {
            Light::Disc(l) => l.sample_p(rng),
            Light::Triangle(l) => l.sample_p(rng),
        }
    }

    pub fn area(&self) -> f32 {
        match self {
            Light::Disc(l) => l.area(),
            Light::Triangle(l) => l.area(),
        }
    }
}

impl From<DiscLight> for Light {
    fn from(l: DiscLight) -> Self {
        Light::Disc(l)
    }
}

impl From<TriangleLight> for Light {
    fn from(l: TriangleLight) -> Self {
        Light::Triangle(l)
    }
}
