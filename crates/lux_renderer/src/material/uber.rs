//! Anisotropic multi-lobe BRDF: Burley diffuse, sheen, anisotropic GGX
//! specular and a GTR1 clearcoat.

use std::f32::consts::FRAC_1_PI;

use lux_math::Vec3;
use rand::RngCore;

use super::{Bxdf, DirectionSample, Interface, SurfacePoint};
use crate::microfacet::{
    gtr1_alpha, gtr1_d, reflect, sample_gtr1_h, schlick_weight, smith_g1_ggx, AnisoGgx,
};
use crate::sampling::{gen_f32, Frame};
use crate::{Color, Side};

/// Clearcoat masking roughness.
const CLEARCOAT_ALPHA: f32 = 0.25;

#[derive(Debug, Clone, Copy)]
pub struct Uber {
    /// Metallic: 0 = dielectric, 1 = metal
    pub metallic: f32,
    /// Roughness: 0 = smooth/glossy, 1 = rough
    pub roughness: f32,
    /// Aspect ratio of the specular highlight along the tangent
    pub anisotropic: f32,
    /// Fresnel reflectance at normal incidence, scaled by 0.08
    pub specular: f32,
    /// Tints the specular towards the base color
    pub specular_tint: f32,
    /// Grazing retro-reflection for cloth
    pub sheen: f32,
    pub sheen_tint: f32,
    /// Second, uncolored specular lobe
    pub clearcoat: f32,
    /// Clearcoat gloss: 0 = satin, 1 = gloss
    pub clearcoat_gloss: f32,
}

impl Default for Uber {
    fn default() -> Self {
        Self {
            metallic: 0.0,
            roughness: 0.5,
            anisotropic: 0.0,
            specular: 0.5,
            specular_tint: 0.0,
            sheen: 0.0,
            sheen_tint: 0.5,
            clearcoat: 0.0,
            clearcoat_gloss: 1.0,
        }
    }
}

impl Uber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_anisotropic(mut self, anisotropic: f32) -> Self {
        self.anisotropic = anisotropic.clamp(0.0, 1.0);
        self
    }

    pub fn with_specular(mut self, specular: f32, tint: f32) -> Self {
        self.specular = specular.clamp(0.0, 1.0);
        self.specular_tint = tint.clamp(0.0, 1.0);
        self
    }

    pub fn with_sheen(mut self, sheen: f32, tint: f32) -> Self {
        self.sheen = sheen.max(0.0);
        self.sheen_tint = tint.clamp(0.0, 1.0);
        self
    }

    pub fn with_clearcoat(mut self, clearcoat: f32, gloss: f32) -> Self {
        self.clearcoat = clearcoat.max(0.0);
        self.clearcoat_gloss = gloss.clamp(0.0, 1.0);
        self
    }

    fn distribution(&self) -> AnisoGgx {
        AnisoGgx::from_roughness(self.roughness, self.anisotropic)
    }

    /// Lobe selection probabilities: (diffuse, specular, clearcoat).
    fn lobe_weights(&self) -> (f32, f32, f32) {
        let diffuse = (1.0 - self.metallic) * (1.0 - 0.5 * self.specular);
        let specular = 1.0 - diffuse;
        let clearcoat = 0.25 * self.clearcoat;
        let total = diffuse + specular + clearcoat;
        (diffuse / total, specular / total, clearcoat / total)
    }

    /// Mixture density of local direction `wi` given local `wo`.
    fn pdf_local(&self, wo: Vec3, wi: Vec3) -> f32 {
        if wi.z <= 0.0 {
            return 0.0;
        }
        let (p_diffuse, p_specular, p_clearcoat) = self.lobe_weights();
        let mut pdf = p_diffuse * wi.z * FRAC_1_PI;

        let h = (wo + wi).normalize_or_zero();
        let wo_dot_h = wo.dot(h);
        if wo_dot_h > 0.0 {
            pdf += p_specular * self.distribution().pdf_h(h) / (4.0 * wo_dot_h);
            if p_clearcoat > 0.0 {
                let alpha = gtr1_alpha(self.clearcoat_gloss);
                pdf += p_clearcoat * gtr1_d(h.z, alpha) * h.z / (4.0 * wo_dot_h);
            }
        }
        pdf
    }
}

/// Hue of `c` with unit luminance.
fn tint(c: Color) -> Color {
    let luminance = c.dot(Vec3::new(0.3, 0.6, 0.1));
    if luminance > 0.0 {
        c / luminance
    } else {
        Color::ONE
    }
}

impl Bxdf for Uber {
    fn sample_wi(
        &self,
        wo: Vec3,
        normal: Vec3,
        side: Side,
        _interface: &Interface,
        rng: &mut dyn RngCore,
    ) -> DirectionSample {
        let frame = Frame::from_normal(normal);
        let wo_local = frame.to_local(wo);
        if wo_local.z <= 0.0 {
            return DirectionSample::invalid(normal, side);
        }

        let (p_diffuse, p_specular, _) = self.lobe_weights();
        let choice = gen_f32(rng);
        let wi_local = if choice < p_diffuse {
            let u1 = gen_f32(rng);
            let u2 = gen_f32(rng);
            let r = u1.sqrt();
            let phi = std::f32::consts::TAU * u2;
            Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - u1).sqrt())
        } else {
            let h = if choice < p_diffuse + p_specular {
                self.distribution().sample_h(rng)
            } else {
                sample_gtr1_h(gtr1_alpha(self.clearcoat_gloss), rng)
            };
            if wo_local.dot(h) <= 0.0 {
                return DirectionSample::invalid(normal, side);
            }
            reflect(wo_local, h)
        };

        if wi_local.z <= 0.0 {
            return DirectionSample::invalid(normal, side);
        }
        let pdf = self.pdf_local(wo_local, wi_local);
        DirectionSample::checked(pdf, frame.to_world(wi_local).normalize(), side, normal)
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
        let frame = Frame::from_normal(outgoing.normal);
        let wo = frame.to_local(wo);
        let wi = frame.to_local(wi);
        let (n_dot_o, n_dot_i) = (wo.z, wi.z);
        if n_dot_o <= 0.0 || n_dot_i <= 0.0 {
            return Color::ZERO;
        }

        let h = (wo + wi).normalize();
        let cos_d = wi.dot(h);
        let fh = schlick_weight(cos_d);
        let c_tint = tint(base_color);

        // Burley diffuse
        let fl = schlick_weight(n_dot_i);
        let fv = schlick_weight(n_dot_o);
        let fd90 = 0.5 + 2.0 * self.roughness * cos_d * cos_d;
        let fd = (1.0 + (fd90 - 1.0) * fl) * (1.0 + (fd90 - 1.0) * fv);
        let diffuse = base_color * (fd * FRAC_1_PI);

        let c_sheen = Color::ONE.lerp(c_tint, self.sheen_tint);
        let sheen = c_sheen * (fh * self.sheen);

        // Anisotropic specular
        let c_spec0 = (Color::ONE.lerp(c_tint, self.specular_tint) * (self.specular * 0.08))
            .lerp(base_color, self.metallic);
        let f_spec = c_spec0.lerp(Color::ONE, fh);
        let ggx = self.distribution();
        let specular = f_spec * (ggx.d(h) * ggx.g(wo, wi) / (4.0 * n_dot_o * n_dot_i));

        // Clearcoat
        let clearcoat = if self.clearcoat > 0.0 {
            let d = gtr1_d(h.z, gtr1_alpha(self.clearcoat_gloss));
            let f = 0.04 + 0.96 * fh;
            let g = smith_g1_ggx(n_dot_o, CLEARCOAT_ALPHA) * smith_g1_ggx(n_dot_i, CLEARCOAT_ALPHA);
            0.25 * self.clearcoat * d * f * g / (4.0 * n_dot_o * n_dot_i)
        } else {
            0.0
        };

        (diffuse + sheen) * (1.0 - self.metallic) + specular + Color::splat(clearcoat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lobe_weights_sum_to_one() {
        let uber = Uber::new().with_metallic(0.3).with_clearcoat(1.0, 0.5);
        let (d, s, c) = uber.lobe_weights();
        assert!((d + s + c - 1.0).abs() < 1e-6);
        assert!(c > 0.0);
    }

    #[test]
    fn test_fully_metallic_has_no_diffuse() {
        let uber = Uber::new().with_metallic(1.0);
        let (d, _, _) = uber.lobe_weights();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_tint_has_unit_luminance() {
        let c = tint(Color::new(0.8, 0.2, 0.1));
        assert!((c.dot(Vec3::new(0.3, 0.6, 0.1)) - 1.0).abs() < 1e-5);
        assert_eq!(tint(Color::ZERO), Color::ONE);
    }
}
