use lux_math::Vec3;
use rand::RngCore;

use super::{Bxdf, DirectionSample, Interface, SurfacePoint};
use crate::microfacet::{
    f0_from_ior, fresnel_schlick_scalar, ggx_d, ggx_reflection_pdf, reflect, sample_ggx_h,
    smith_g_schlick, MIN_ALPHA,
};
use crate::sampling::{cosine_hemisphere_pdf, gen_f32, sample_cosine_hemisphere};
use crate::{Color, Side};

/// GGX specular coat over a Lambertian base, blended by Fresnel.
///
/// The specular lobe is uncolored; the base color only tints the diffuse
/// lobe.
#[derive(Debug, Clone, Copy)]
pub struct NonMetal {
    pub roughness: f32,
    /// Index of refraction of the coat, sets the normal-incidence reflectance
    pub ior: f32,
}

impl NonMetal {
    pub fn new(roughness: f32) -> Self {
        Self {
            roughness: roughness.clamp(0.0, 1.0),
            ior: 1.5,
        }
    }

    fn alpha(&self) -> f32 {
        self.roughness.max(MIN_ALPHA)
    }

    /// Probability of sampling the specular lobe for a given view angle.
    fn specular_probability(&self, n_dot_o: f32) -> f32 {
        fresnel_schlick_scalar(f0_from_ior(self.ior), n_dot_o).clamp(0.0, 1.0)
    }

    fn pdf(&self, wo: Vec3, normal: Vec3, wi: Vec3) -> f32 {
        let p_spec = self.specular_probability(normal.dot(wo));
        let h = (wo + wi).normalize_or_zero();
        let spec = ggx_reflection_pdf(normal.dot(h), wo.dot(h), self.alpha());
        p_spec * spec + (1.0 - p_spec) * cosine_hemisphere_pdf(normal, wi)
    }
}

impl Bxdf for NonMetal {
    fn sample_wi(
        &self,
        wo: Vec3,
        normal: Vec3,
        side: Side,
        _interface: &Interface,
        rng: &mut dyn RngCore,
    ) -> DirectionSample {
        let p_spec = self.specular_probability(normal.dot(wo));

        let wi = if gen_f32(rng) < p_spec {
            let h = sample_ggx_h(normal, self.alpha(), rng);
            if wo.dot(h) <= 0.0 {
                return DirectionSample::invalid(normal, side);
            }
            reflect(wo, h)
        } else {
            sample_cosine_hemisphere(normal, rng).0
        };

        if wi.dot(normal) <= 0.0 {
            return DirectionSample::invalid(normal, side);
        }
        DirectionSample::checked(self.pdf(wo, normal, wi), wi, side, normal)
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
        let f0 = f0_from_ior(self.ior);
        let h = (wo + wi).normalize();
        let f = fresnel_schlick_scalar(f0, wi.dot(h));
        let d = ggx_d(n.dot(h), alpha);
        let g = smith_g_schlick(n_dot_i, n_dot_o, alpha);
        let specular = f * d * g / (4.0 * n_dot_o * n_dot_i);

        let diffuse_weight = 1.0 - fresnel_schlick_scalar(f0, n_dot_o);
        Color::splat(specular) + base_color * (diffuse_weight * std::f32::consts::FRAC_1_PI)
    }
}
