//! Microfacet distributions, masking terms and Fresnel helpers.
//!
//! Conventions: all directions point away from the surface, `n` is the
//! macro normal on the side of `wo`, and roughness enters the isotropic
//! GGX helpers as `alpha` directly.

use std::f32::consts::{PI, TAU};

use lux_math::Vec3;
use rand::RngCore;

use crate::sampling::gen_f32;
use crate::Color;

/// Smallest alpha the models accept. Keeps D finite for mirror-like
/// surfaces.
pub const MIN_ALPHA: f32 = 1e-3;

/// GGX / Trowbridge-Reitz normal distribution.
#[inline]
pub fn ggx_d(n_dot_h: f32, alpha: f32) -> f32 {
    if n_dot_h <= 0.0 {
        return 0.0;
    }
    let a2 = alpha * alpha;
    let denom = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom)
}

/// Schlick-GGX masking for one direction, `k = alpha / 2`.
#[inline]
pub fn smith_g1_schlick(n_dot_v: f32, alpha: f32) -> f32 {
    let k = alpha * 0.5;
    n_dot_v / (n_dot_v * (1.0 - k) + k)
}

/// Separable Schlick-GGX shadowing-masking.
#[inline]
pub fn smith_g_schlick(n_dot_l: f32, n_dot_v: f32, alpha: f32) -> f32 {
    smith_g1_schlick(n_dot_l, alpha) * smith_g1_schlick(n_dot_v, alpha)
}

/// Exact Smith masking for isotropic GGX. `cos_v` may be negative for
/// transmitted directions; only its magnitude matters.
pub fn smith_g1_ggx(cos_v: f32, alpha: f32) -> f32 {
    let c2 = (cos_v * cos_v).max(1e-12);
    let tan2 = ((1.0 - c2) / c2).max(0.0);
    2.0 / (1.0 + (1.0 + alpha * alpha * tan2).sqrt())
}

/// Sample a GGX microfacet normal around `n`. Density over solid angle is
/// [`ggx_h_pdf`].
pub fn sample_ggx_h(n: Vec3, alpha: f32, rng: &mut dyn RngCore) -> Vec3 {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);

    let theta = (alpha * (u1 / (1.0 - u1)).sqrt()).atan();
    let phi = TAU * u2;
    let (sin_theta, cos_theta) = theta.sin_cos();

    let (b1, b2) = crate::sampling::build_basis(n);
    n * cos_theta + b1 * (phi.cos() * sin_theta) + b2 * (phi.sin() * sin_theta)
}

/// Solid-angle density of a GGX-sampled half vector.
#[inline]
pub fn ggx_h_pdf(n_dot_h: f32, alpha: f32) -> f32 {
    ggx_d(n_dot_h, alpha) * n_dot_h.max(0.0)
}

/// Density of the reflected direction when the half vector is GGX-sampled.
#[inline]
pub fn ggx_reflection_pdf(n_dot_h: f32, wo_dot_h: f32, alpha: f32) -> f32 {
    if wo_dot_h <= 0.0 {
        return 0.0;
    }
    ggx_h_pdf(n_dot_h, alpha) / (4.0 * wo_dot_h)
}

/// Mirror `wo` about `h`. Both vectors point away from the surface.
#[inline]
pub fn reflect(wo: Vec3, h: Vec3) -> Vec3 {
    2.0 * wo.dot(h) * h - wo
}

/// Refract `wo` through the microfacet `h` (on the side of `wo`).
/// `eta` is `eta_o / eta_i`. Returns `None` on total internal reflection.
pub fn refract(wo: Vec3, h: Vec3, eta: f32) -> Option<Vec3> {
    let cos_o = wo.dot(h);
    let sin2_i = eta * eta * (1.0 - cos_o * cos_o).max(0.0);
    if sin2_i >= 1.0 {
        return None;
    }
    let cos_i = (1.0 - sin2_i).sqrt();
    Some((-eta * wo + (eta * cos_o - cos_i) * h).normalize())
}

/// (1 - cos)^5
#[inline]
pub fn schlick_weight(cos_theta: f32) -> f32 {
    let x = (1.0 - cos_theta).clamp(0.0, 1.0);
    let x2 = x * x;
    x2 * x2 * x
}

#[inline]
pub fn fresnel_schlick(f0: Color, cos_theta: f32) -> Color {
    f0 + (Color::ONE - f0) * schlick_weight(cos_theta)
}

#[inline]
pub fn fresnel_schlick_scalar(f0: f32, cos_theta: f32) -> f32 {
    f0 + (1.0 - f0) * schlick_weight(cos_theta)
}

/// Normal-incidence reflectance of a dielectric in vacuum.
#[inline]
pub fn f0_from_ior(ior: f32) -> f32 {
    let r = (1.0 - ior) / (1.0 + ior);
    r * r
}

/// Unpolarized Fresnel reflectance for light leaving medium `eta_o` at
/// angle `cos_o` into medium `eta_i`. Returns 1 under total internal
/// reflection.
pub fn fresnel_dielectric(cos_o: f32, eta_o: f32, eta_i: f32) -> f32 {
    let cos_o = cos_o.clamp(0.0, 1.0);
    let eta = eta_o / eta_i;
    let sin2_i = eta * eta * (1.0 - cos_o * cos_o);
    if sin2_i >= 1.0 {
        return 1.0;
    }
    let cos_i = (1.0 - sin2_i).sqrt();

    let rs = (eta_o * cos_o - eta_i * cos_i) / (eta_o * cos_o + eta_i * cos_i);
    let rp = (eta_i * cos_o - eta_o * cos_i) / (eta_i * cos_o + eta_o * cos_i);
    (0.5 * (rs * rs + rp * rp)).clamp(0.0, 1.0)
}

/// Anisotropic GGX in a local frame where `z` is the normal and `x`/`y`
/// are the tangent directions.
#[derive(Debug, Clone, Copy)]
pub struct AnisoGgx {
    pub ax: f32,
    pub ay: f32,
}

impl AnisoGgx {
    /// Disney mapping: `alpha = roughness^2`, stretched by `anisotropic`.
    pub fn from_roughness(roughness: f32, anisotropic: f32) -> Self {
        let aspect = (1.0 - 0.9 * anisotropic.clamp(0.0, 1.0)).sqrt();
        let r2 = roughness * roughness;
        Self {
            ax: (r2 / aspect).max(MIN_ALPHA),
            ay: (r2 * aspect).max(MIN_ALPHA),
        }
    }

    pub fn d(&self, h: Vec3) -> f32 {
        if h.z <= 0.0 {
            return 0.0;
        }
        let x = h.x / self.ax;
        let y = h.y / self.ay;
        let s = x * x + y * y + h.z * h.z;
        1.0 / (PI * self.ax * self.ay * s * s)
    }

    fn lambda(&self, v: Vec3) -> f32 {
        let z2 = (v.z * v.z).max(1e-12);
        let t = (self.ax * self.ax * v.x * v.x + self.ay * self.ay * v.y * v.y) / z2;
        0.5 * (-1.0 + (1.0 + t).sqrt())
    }

    /// Smith masking for one direction.
    pub fn g1(&self, v: Vec3) -> f32 {
        1.0 / (1.0 + self.lambda(v))
    }

    /// Height-correlated shadowing-masking.
    pub fn g(&self, wo: Vec3, wi: Vec3) -> f32 {
        1.0 / (1.0 + self.lambda(wo) + self.lambda(wi))
    }

    /// Sample a local half vector with density [`AnisoGgx::pdf_h`].
    pub fn sample_h(&self, rng: &mut dyn RngCore) -> Vec3 {
        let u1 = gen_f32(rng);
        let u2 = gen_f32(rng);

        let t = TAU * u2;
        let phi = (self.ay * t.sin()).atan2(self.ax * t.cos());
        let (sin_phi, cos_phi) = phi.sin_cos();

        let inv_a2 = cos_phi * cos_phi / (self.ax * self.ax)
            + sin_phi * sin_phi / (self.ay * self.ay);
        let tan2 = u1 / (1.0 - u1) / inv_a2;
        let cos_theta = 1.0 / (1.0 + tan2).sqrt();
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        Vec3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
    }

    pub fn pdf_h(&self, h: Vec3) -> f32 {
        self.d(h) * h.z.max(0.0)
    }
}

/// Clearcoat alpha from gloss: satin (0) to mirror-like (1).
#[inline]
pub fn gtr1_alpha(gloss: f32) -> f32 {
    0.1 + (0.001 - 0.1) * gloss.clamp(0.0, 1.0)
}

/// Berry / GTR1 distribution used by the clearcoat lobe.
pub fn gtr1_d(n_dot_h: f32, alpha: f32) -> f32 {
    if n_dot_h <= 0.0 {
        return 0.0;
    }
    let a2 = alpha * alpha;
    let t = 1.0 + (a2 - 1.0) * n_dot_h * n_dot_h;
    (a2 - 1.0) / (PI * a2.ln() * t)
}

/// Sample a local GTR1 half vector with density `gtr1_d(h.z) * h.z`.
pub fn sample_gtr1_h(alpha: f32, rng: &mut dyn RngCore) -> Vec3 {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);

    let a2 = alpha * alpha;
    let cos2 = ((1.0 - a2.powf(1.0 - u1)) / (1.0 - a2)).clamp(0.0, 1.0);
    let cos_theta = cos2.sqrt();
    let sin_theta = (1.0 - cos2).sqrt();
    let phi = TAU * u2;

    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Midpoint-rule integral over the upper hemisphere of a local-frame
    /// function.
    fn integrate_hemisphere(f: impl Fn(Vec3) -> f32) -> f32 {
        let (n_theta, n_phi) = (400, 200);
        let d_theta = 0.5 * PI / n_theta as f32;
        let d_phi = TAU / n_phi as f32;
        let mut sum = 0.0;
        for i in 0..n_theta {
            let theta = (i as f32 + 0.5) * d_theta;
            let (s, c) = theta.sin_cos();
            for j in 0..n_phi {
                let phi = (j as f32 + 0.5) * d_phi;
                let w = Vec3::new(s * phi.cos(), s * phi.sin(), c);
                sum += f(w) * s * d_theta * d_phi;
            }
        }
        sum
    }

    #[test]
    fn test_ggx_projected_area_is_one() {
        for alpha in [0.2, 0.5, 1.0] {
            let total = integrate_hemisphere(|h| ggx_d(h.z, alpha) * h.z);
            assert!((total - 1.0).abs() < 0.01, "alpha {}: {}", alpha, total);
        }
    }

    #[test]
    fn test_aniso_projected_area_is_one() {
        let ggx = AnisoGgx { ax: 0.3, ay: 0.6 };
        let total = integrate_hemisphere(|h| ggx.d(h) * h.z);
        assert!((total - 1.0).abs() < 0.01, "{}", total);
    }

    #[test]
    fn test_gtr1_projected_area_is_one() {
        let total = integrate_hemisphere(|h| gtr1_d(h.z, 0.1) * h.z);
        assert!((total - 1.0).abs() < 0.01, "{}", total);
    }

    #[test]
    fn test_sampled_half_vectors_are_unit_and_above() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = Vec3::new(0.0, 1.0, 0.0);
        let ggx = AnisoGgx::from_roughness(0.5, 0.8);
        for _ in 0..1000 {
            let h = sample_ggx_h(n, 0.4, &mut rng);
            assert!((h.length() - 1.0).abs() < 1e-4);
            assert!(h.dot(n) >= 0.0);

            let ha = ggx.sample_h(&mut rng);
            assert!((ha.length() - 1.0).abs() < 1e-4);
            assert!(ha.z >= 0.0);

            let hc = sample_gtr1_h(0.1, &mut rng);
            assert!((hc.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_fresnel_dielectric() {
        // 4% at normal incidence for glass
        assert!((fresnel_dielectric(1.0, 1.0, 1.5) - 0.04).abs() < 1e-4);
        // symmetric at normal incidence
        assert!((fresnel_dielectric(1.0, 1.5, 1.0) - 0.04).abs() < 1e-4);
        // beyond the critical angle (~41.8 deg) inside glass
        let cos_60 = 0.5;
        assert_eq!(fresnel_dielectric(cos_60, 1.5, 1.0), 1.0);
        // grazing from outside reflects nearly everything
        assert!(fresnel_dielectric(0.01, 1.0, 1.5) > 0.9);
        assert!((f0_from_ior(1.5) - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_refract_obeys_snell() {
        let n = Vec3::Z;
        let wo = Vec3::new(0.5, 0.0, 0.75_f32.sqrt());
        let wi = refract(wo, n, 1.0 / 1.5).unwrap();

        assert!(wi.z < 0.0);
        let sin_o = 0.5;
        let sin_i = (1.0 - wi.z * wi.z).sqrt();
        assert!((1.0 * sin_o - 1.5 * sin_i).abs() < 1e-4);
        // tangential component flips direction
        assert!(wi.x < 0.0);

        // leaving glass at 64 degrees is past the critical angle
        let grazing = Vec3::new(0.9, 0.0, 0.19_f32.sqrt());
        assert!(refract(grazing, n, 1.5).is_none());
    }

    #[test]
    fn test_reflect_preserves_angle() {
        let h = Vec3::Z;
        let wo = Vec3::new(0.6, 0.0, 0.8);
        assert!((reflect(wo, h) - Vec3::new(-0.6, 0.0, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_schlick_endpoints() {
        assert!((schlick_weight(1.0) - 0.0).abs() < 1e-6);
        assert!((schlick_weight(0.0) - 1.0).abs() < 1e-6);
        let f = fresnel_schlick(Color::new(0.9, 0.5, 0.1), 0.0);
        assert!((f - Color::ONE).length() < 1e-6);
    }

    #[test]
    fn test_smith_terms_bounded() {
        for c in [0.05, 0.3, 0.7, 1.0] {
            for a in [0.1, 0.5, 1.0] {
                let g = smith_g1_schlick(c, a);
                assert!(g > 0.0 && g <= 1.0 + 1e-6);
                let g = smith_g1_ggx(c, a);
                assert!(g > 0.0 && g <= 1.0 + 1e-6);
            }
        }
        assert!((smith_g1_ggx(1.0, 0.5) - 1.0).abs() < 1e-5);
    }
}
