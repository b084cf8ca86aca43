//! Materials: shared surface data plus one BSDF model per [`Model`] variant.
//!
//! Every direction passed in or returned is a unit vector pointing away
//! from the surface. Normals passed in face the same side as `wo`.

mod dielectric;
mod diffuse;
mod medium;
mod metal;
mod nonmetal;
mod subsurface;
mod uber;

pub use dielectric::Dielectric;
pub use diffuse::Diffuse;
pub use medium::{Interface, Medium};
pub use metal::Metal;
pub use nonmetal::NonMetal;
pub use subsurface::Subsurface;
pub use uber::Uber;

use std::sync::Arc;

use lux_core::Texture;
use lux_math::{Vec2, Vec3};
use rand::RngCore;

use crate::hittable::Hittable;
use crate::sampling::{is_unit, Frame};
use crate::{Color, Side};

/// Density reported for samples that cannot contribute (below the surface,
/// total internal reflection, vanishing density). Dividing by it drives the
/// contribution to zero.
pub const INVALID_PDF: f32 = 1e8;

/// Densities below this are treated as invalid.
const MIN_PDF: f32 = 1e-8;

/// Result of sampling an incident direction.
#[derive(Debug, Clone, Copy)]
pub struct DirectionSample {
    pub pdf: f32,
    pub wi: Vec3,
    /// Side of the surface `wi` points into
    pub side: Side,
}

impl DirectionSample {
    /// A sample that carries no energy.
    pub fn invalid(normal: Vec3, side: Side) -> Self {
        Self {
            pdf: INVALID_PDF,
            wi: normal,
            side,
        }
    }

    /// Wrap `pdf`, replacing degenerate densities with the sentinel.
    pub(crate) fn checked(pdf: f32, wi: Vec3, side: Side, normal: Vec3) -> Self {
        if !pdf.is_finite() || pdf < MIN_PDF {
            return Self::invalid(normal, side);
        }
        Self { pdf, wi, side }
    }

    pub fn is_invalid(&self) -> bool {
        self.pdf >= INVALID_PDF
    }
}

/// Result of sampling the point where light enters the surface.
#[derive(Debug, Clone, Copy)]
pub struct PositionSample {
    /// Area density, 1 for opaque models
    pub pdf: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// One end of a scattering event.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    pub point: Vec3,
    /// Shading normal, facing the direction that leaves this point
    pub normal: Vec3,
    pub side: Side,
}

/// Scattering model interface implemented by every [`Model`] variant.
pub(crate) trait Bxdf {
    /// Importance-sample an incident direction for outgoing `wo`.
    fn sample_wi(
        &self,
        wo: Vec3,
        normal: Vec3,
        side: Side,
        interface: &Interface,
        rng: &mut dyn RngCore,
    ) -> DirectionSample;

    /// BSDF value for light arriving along `wi` at `incident` and leaving
    /// along `wo` at `outgoing`.
    fn bsdf(
        &self,
        base_color: Color,
        wo: Vec3,
        outgoing: &SurfacePoint,
        wi: Vec3,
        incident: &SurfacePoint,
        interface: &Interface,
    ) -> Color;

    /// Whether next-event estimation is worthwhile for this model.
    fn samples_light(&self) -> bool {
        true
    }
}

/// The closed set of scattering models.
#[derive(Debug, Clone, Copy)]
pub enum Model {
    Diffuse(Diffuse),
    Metal(Metal),
    NonMetal(NonMetal),
    Subsurface(Subsurface),
    Dielectric(Dielectric),
    Uber(Uber),
}

impl Model {
    fn bxdf(&self) -> &dyn Bxdf {
        match self {
            Model::Diffuse(m) => m,
            Model::Metal(m) => m,
            Model::NonMetal(m) => m,
            Model::Subsurface(m) => m,
            Model::Dielectric(m) => m,
            Model::Uber(m) => m,
        }
    }
}

/// A surface description, shared read-only by every primitive that uses it.
#[derive(Clone)]
pub struct Material {
    emission: Color,
    texture: Arc<Texture>,
    normal_map: Option<Arc<Texture>>,
    outside: Option<Medium>,
    inside: Option<Medium>,
    /// Overrides the model's light-sampling default when set
    sample_light: Option<bool>,
    model: Model,
}

impl Material {
    pub fn new(model: Model, base_color: Color) -> Self {
        Self {
            emission: Color::ZERO,
            texture: Arc::new(Texture::solid(base_color)),
            normal_map: None,
            outside: None,
            inside: None,
            sample_light: None,
            model,
        }
    }

    pub fn diffuse(color: Color) -> Self {
        Self::new(Model::Diffuse(Diffuse), color)
    }

    pub fn metal(color: Color, roughness: f32) -> Self {
        Self::new(Model::Metal(Metal::new(roughness)), color)
    }

    pub fn non_metal(color: Color, roughness: f32) -> Self {
        Self::new(Model::NonMetal(NonMetal::new(roughness)), color)
    }

    /// `radius` is the spread of the diffusion kernel in scene units.
    pub fn subsurface(color: Color, radius: f32) -> Self {
        Self::new(Model::Subsurface(Subsurface::new(radius)), color)
    }

    /// Glass-like material in vacuum with the given index of refraction.
    pub fn dielectric(ior: f32, roughness: f32) -> Self {
        Self::new(Model::Dielectric(Dielectric::new(roughness)), Color::ONE)
            .with_inside(Medium::new(ior))
    }

    pub fn uber(color: Color, params: Uber) -> Self {
        Self::new(Model::Uber(params), color)
    }

    /// Black emitter; does not reflect and skips light sampling.
    pub fn emissive(radiance: Color) -> Self {
        Self::diffuse(Color::ZERO)
            .with_emission(radiance)
            .with_sample_light(false)
    }

    pub fn diffuse_white() -> Self {
        Self::diffuse(Color::ONE)
    }

    pub fn diffuse_red() -> Self {
        Self::diffuse(Color::new(1.0, 0.0, 0.0))
    }

    pub fn diffuse_green() -> Self {
        Self::diffuse(Color::new(0.0, 1.0, 0.0))
    }

    pub fn diffuse_blue() -> Self {
        Self::diffuse(Color::new(0.0, 0.0, 1.0))
    }

    pub fn metal_aluminum(roughness: f32) -> Self {
        Self::metal(Color::new(0.939, 0.914, 0.822), roughness)
    }

    pub fn metal_gold(roughness: f32) -> Self {
        Self::metal(Color::new(1.0, 0.582, 0.0956), roughness)
    }

    pub fn metal_copper(roughness: f32) -> Self {
        Self::metal(Color::new(0.904, 0.372, 0.256), roughness)
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = texture;
        self
    }

    /// Tangent-space normal map, decoded as linear data.
    pub fn with_normal_map(mut self, normal_map: Arc<Texture>) -> Self {
        self.normal_map = Some(normal_map);
        self
    }

    pub fn with_outside(mut self, medium: Medium) -> Self {
        self.outside = Some(medium);
        self
    }

    pub fn with_inside(mut self, medium: Medium) -> Self {
        self.inside = Some(medium);
        self
    }

    pub fn with_sample_light(mut self, sample_light: bool) -> Self {
        self.sample_light = Some(sample_light);
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Sample an incident direction for light leaving along `wo`.
    pub fn sample_wi(
        &self,
        wo: Vec3,
        normal: Vec3,
        side: Side,
        rng: &mut dyn RngCore,
    ) -> DirectionSample {
        debug_assert!(is_unit(wo), "wo must be unit length: {wo}");
        debug_assert!(is_unit(normal), "normal must be unit length: {normal}");
        self.model
            .bxdf()
            .sample_wi(wo, normal, side, &self.interface(), rng)
    }

    /// Sample the point where light enters. The identity for every model
    /// except [`Subsurface`].
    pub fn sample_position(
        &self,
        normal: Vec3,
        point: Vec3,
        scene: &dyn Hittable,
        rng: &mut dyn RngCore,
    ) -> PositionSample {
        match &self.model {
            Model::Subsurface(s) => s.sample_position(self, normal, point, scene, rng),
            _ => PositionSample {
                pdf: 1.0,
                point,
                normal,
            },
        }
    }

    pub fn bsdf(
        &self,
        wo: Vec3,
        outgoing: &SurfacePoint,
        uv: Vec2,
        wi: Vec3,
        incident: &SurfacePoint,
    ) -> Color {
        debug_assert!(is_unit(wo), "wo must be unit length: {wo}");
        debug_assert!(is_unit(wi), "wi must be unit length: {wi}");
        let base_color = self.texture.value(uv);
        self.model
            .bxdf()
            .bsdf(base_color, wo, outgoing, wi, incident, &self.interface())
    }

    pub fn radiance(&self) -> Color {
        self.emission
    }

    pub fn sample_light(&self) -> bool {
        self.sample_light
            .unwrap_or_else(|| self.model.bxdf().samples_light())
    }

    /// Opacity at `uv`, from the base-color texture's alpha channel.
    pub fn alpha(&self, uv: Vec2) -> f32 {
        self.texture.alpha(uv)
    }

    /// Normal perturbed by the normal map. Falls back to `normal` when there
    /// is no map or the perturbed normal leaves the hemisphere.
    pub fn shading_normal(&self, normal: Vec3, uv: Vec2) -> Vec3 {
        let Some(map) = &self.normal_map else {
            return normal;
        };
        let tangent = map.value(uv) * 2.0 - Vec3::ONE;
        match Frame::from_normal(normal).to_world(tangent).try_normalize() {
            Some(n) if n.dot(normal) > 0.0 => n,
            _ => normal,
        }
    }

    /// Medium on `side`, vacuum when unspecified.
    pub fn medium(&self, side: Side) -> Medium {
        self.interface().medium(side)
    }

    pub fn interface(&self) -> Interface {
        Interface {
            outside: self.outside.unwrap_or_default(),
            inside: self.inside.unwrap_or_default(),
        }
    }
}
