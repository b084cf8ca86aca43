//! Diffusion approximation of subsurface scattering.
//!
//! Light enters at one point and re-emerges nearby. Entry points are drawn
//! from a Gaussian disc in the tangent plane and projected back onto the
//! surface with two probe rays along the normal.

use std::f32::consts::{FRAC_1_PI, PI, TAU};

use lux_math::{Interval, Vec3};
use rand::RngCore;

use super::{Bxdf, DirectionSample, Interface, Material, PositionSample, SurfacePoint};
use crate::hittable::{HitRecord, Hittable};
use crate::microfacet::{f0_from_ior, fresnel_schlick_scalar};
use crate::sampling::{gen_f32, sample_cosine_hemisphere, Frame};
use crate::{Color, Ray, Side};

/// Probes reach this many radii past the disc plane.
const PROBE_REACH: f32 = 4.0;

#[derive(Debug, Clone, Copy)]
pub struct Subsurface {
    /// Standard deviation of the diffusion kernel, in scene units
    pub radius: f32,
    pub ior: f32,
}

impl Subsurface {
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.abs().max(1e-4),
            ior: 1.3,
        }
    }

    /// Normalized 2D Gaussian, also the area density of the disc sample.
    pub fn kernel(&self, r: f32) -> f32 {
        let s2 = self.radius * self.radius;
        (-r * r / (2.0 * s2)).exp() / (2.0 * PI * s2)
    }

    pub(crate) fn sample_position(
        &self,
        material: &Material,
        normal: Vec3,
        point: Vec3,
        scene: &dyn Hittable,
        rng: &mut dyn RngCore,
    ) -> PositionSample {
        let sigma = self.radius;
        // Rayleigh-distributed radius gives a Gaussian disc
        let r = sigma * (-2.0 * (1.0 - gen_f32(rng)).ln()).sqrt();
        let phi = TAU * gen_f32(rng);
        let frame = Frame::from_normal(normal);
        let disc = point + frame.x * (r * phi.cos()) + frame.y * (r * phi.sin());

        let reach = Interval::new(0.0, PROBE_REACH * sigma);
        let mut best: Option<(f32, HitRecord<'_>)> = None;
        for dir in [-normal, normal] {
            let probe = Ray::new(disc - dir * sigma, dir);
            let Some(rec) = scene.hit(&probe, reach) else {
                continue;
            };
            if !std::ptr::eq(rec.material, material) {
                continue;
            }
            let offset = (rec.t - sigma).abs();
            if best.as_ref().map_or(true, |(d, _)| offset < *d) {
                best = Some((offset, rec));
            }
        }

        match best {
            Some((_, rec)) => {
                let n = rec.outward_normal();
                let n = if n.dot(normal) < 0.0 { -n } else { n };
                PositionSample {
                    pdf: self.kernel(r),
                    point: rec.p,
                    normal: n,
                }
            }
            None => PositionSample {
                pdf: self.kernel(0.0),
                point,
                normal,
            },
        }
    }
}

impl Bxdf for Subsurface {
    fn sample_wi(
        &self,
        _wo: Vec3,
        normal: Vec3,
        side: Side,
        _interface: &Interface,
        rng: &mut dyn RngCore,
    ) -> DirectionSample {
        let (wi, pdf) = sample_cosine_hemisphere(normal, rng);
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
        let f0 = f0_from_ior(self.ior);
        let t_o = 1.0 - fresnel_schlick_scalar(f0, outgoing.normal.dot(wo).max(0.0));
        let t_i = 1.0 - fresnel_schlick_scalar(f0, incident.normal.dot(wi).max(0.0));
        let r = outgoing.point.distance(incident.point);
        base_color * (self.kernel(r) * t_o * t_i * FRAC_1_PI)
    }
}
