use std::f32::consts::FRAC_1_PI;

use lux_math::Vec3;
use rand::RngCore;

use super::{Bxdf, DirectionSample, Interface, SurfacePoint};
use crate::sampling::sample_cosine_hemisphere;
use crate::{Color, Side};

/// Lambertian reflection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diffuse;

impl Bxdf for Diffuse {
    fn sample_wi(
        &self,
        _wo: Vec3,
        normal: Vec3,
        side: Side,
        _interface: &Interface,
        rng: &mut dyn RngCore,
    ) -> DirectionSample {
        let (wi, pdf) = sample_cosine_hemisphere(normal, rng);
        if pdf <= 0.0 {
            return DirectionSample::invalid(normal, side);
        }
        DirectionSample { pdf, wi, side }
    }

    fn bsdf(
        &self,
        base_color: Color,
        _wo: Vec3,
        outgoing: &SurfacePoint,
        _wi: Vec3,
        incident: &SurfacePoint,
        _interface: &Interface,
    ) -> Color {
        if outgoing.side != incident.side {
            return Color::ZERO;
        }
        base_color * FRAC_1_PI
    }
}
