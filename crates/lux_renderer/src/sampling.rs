//! Random sampling helpers shared by materials, lights and the driver.
//!
//! Nothing here owns generator state: callers pass the generator in.

use std::f32::consts::{PI, TAU};

use lux_math::{Vec2, Vec3};
use rand::{Rng, RngCore};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Two tangent vectors completing an orthonormal basis around unit `n`.
///
/// Frisvad's construction, with the pole at `n.z = -1` handled separately.
pub fn build_basis(n: Vec3) -> (Vec3, Vec3) {
    if n.z < -0.999_999_9 {
        return (Vec3::new(0.0, -1.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
    }
    let a = 1.0 / (1.0 + n.z);
    let b = -n.x * n.y * a;
    let t = Vec3::new(1.0 - n.x * n.x * a, b, -n.x);
    let bt = Vec3::new(b, 1.0 - n.y * n.y * a, -n.y);
    (t, bt)
}

/// Local shading frame: `x`/`y` tangents and `z` = normal.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl Frame {
    pub fn from_normal(n: Vec3) -> Self {
        let (x, y) = build_basis(n);
        Self { x, y, z: n }
    }

    #[inline]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.x), v.dot(self.y), v.dot(self.z))
    }

    #[inline]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }
}

/// Cosine-weighted direction around `n`, with its density `cos(theta)/pi`.
pub fn sample_cosine_hemisphere(n: Vec3, rng: &mut dyn RngCore) -> (Vec3, f32) {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);

    let cos_theta = (1.0 - u1).sqrt();
    let sin_theta = u1.sqrt();
    let phi = TAU * u2;

    let local = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
    (Frame::from_normal(n).to_world(local), cos_theta / PI)
}

/// Density of [`sample_cosine_hemisphere`] for direction `wi`.
#[inline]
pub fn cosine_hemisphere_pdf(n: Vec3, wi: Vec3) -> f32 {
    n.dot(wi).max(0.0) / PI
}

/// Uniform point on the unit disc.
pub fn sample_unit_disc(rng: &mut dyn RngCore) -> Vec2 {
    let r = gen_f32(rng).sqrt();
    let phi = TAU * gen_f32(rng);
    Vec2::new(r * phi.cos(), r * phi.sin())
}

/// SplitMix64 finalizer. Turns a (seed, index) pair into a well-mixed
/// per-pixel seed.
pub fn mix_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Debug check for the unit-direction contract of the BSDF interface.
#[inline]
pub(crate) fn is_unit(v: Vec3) -> bool {
    (v.length_squared() - 1.0).abs() < 1e-3
}
