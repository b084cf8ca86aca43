use lux_math::Vec3;
use rand::RngCore;

use super::{Bxdf, DirectionSample, Interface, SurfacePoint};
use crate::microfacet::{
    fresnel_schlick, ggx_d, ggx_reflection_pdf, reflect, sample_ggx_h, smith_g_schlick, MIN_ALPHA,
};
use crate::{Color, Side};

/// GGX conductor. The base color is the normal-incidence reflectance.
#[derive(Debug, Clone, Copy)]
pub struct Metal {
    pub roughness: f32,
}

impl Metal {
    pub fn new(roughness: f32) -> Self {
        Self {
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    fn alpha(&self) -> f32 {
        self.roughness.max(MIN_ALPHA)
    }
}

impl Bxdf for Metal {
    fn sample_wi(
        &self,
        wo: Vec3,
        normal: Vec3,
        side: Side,
        _interface: &Interface,
        rng: &mut dyn RngCore,
    ) -> DirectionSample {
        let alpha = self.alpha();
        let h = sample_ggx_h(normal, alpha, rng);
        let wo_dot_h = wo.dot(h);
        if wo_dot_h <= 0.0 {
            return DirectionSample::invalid(normal, side);
        }

        let wi = reflect(wo, h);
        if wi.dot(normal) <= 0.0 {
            return DirectionSample::invalid(normal, side);
        }

        let pdf = ggx_reflection_pdf(normal.dot(h), wo_dot_h, alpha);
        DirectionSample::checked(pdf, wi, side, normal)
    }

    fn bsdf(
        &self,
        base_color: Color,
        wo: Vec3,
        outgoing: &SurfacePoint,
        wi: Vec3,
        incident: &SurfacePoint,
        _interface: &Interface,
    ) -> Color {
        if outgoing.side != incident.side {
            return Color::ZERO;
        }
        let n = outgoing.normal;
        let n_dot_o = n.dot(wo);
        let n_dot_i = n.dot(wi);
        if n_dot_o <= 0.0 || n_dot_i <= 0.0 {
            return Color::ZERO;
        }

        let alpha = self.alpha();
        let h = (wo + wi).normalize();
        let f = fresnel_schlick(base_color, wi.dot(h));
        let d = ggx_d(n.dot(h), alpha);
        let g = smith_g_schlick(n_dot_i, n_dot_o, alpha);
        f * (d * g / (4.0 * n_dot_o * n_dot_i))
    }
}
