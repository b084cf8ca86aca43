//! Path integrator.
//!
//! At every opaque hit the estimate is emission + next-event estimation +
//! one BSDF-sampled bounce (kept with probability `survival_probability`).
//! Surfaces with texture alpha below one are stochastically transparent.

use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::material::{DirectionSample, Material, SurfacePoint};
use crate::sampling::gen_f32;
use crate::{Color, Ray, RenderConfig, Scene};
use lux_math::{Interval, Vec2, Vec3};

/// Smallest hit distance accepted on any traced ray.
const T_MIN: f32 = 1e-6;

/// Forward nudge when a ray passes through a transparent surface.
const PASS_THROUGH_OFFSET: f32 = 1e-5;

/// Refraction events do not consume depth. This bounds the number of
/// consecutive ones so a path between facing interfaces still ends.
const MAX_TRANSMISSIONS: u32 = 64;

/// Estimate the radiance arriving along `ray`.
///
/// `depth` is the remaining bounce budget; zero returns black.
pub fn ray_color(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    trace(ray, scene, depth, 0, config, rng)
}

fn trace(
    ray: &Ray,
    scene: &Scene,
    mut depth: u32,
    transmissions: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut ray = *ray;
    loop {
        if depth == 0 {
            return Color::ZERO;
        }
        let Some(rec) = scene.hit(&ray, Interval::new(T_MIN, f32::INFINITY)) else {
            return config.background;
        };

        // Stochastic alpha: pass through with probability 1 - alpha
        if gen_f32(rng) >= rec.material.alpha(rec.uv) {
            if gen_f32(rng) < config.alpha_depth_probability {
                depth -= 1;
            }
            ray = ray.advance(rec.t, PASS_THROUGH_OFFSET);
            continue;
        }

        return shade(&ray, &rec, scene, depth, transmissions, config, rng);
    }
}

fn shade(
    ray: &Ray,
    rec: &HitRecord<'_>,
    scene: &Scene,
    depth: u32,
    transmissions: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let material = rec.material;
    let wo = -ray.direction();
    let outgoing = SurfacePoint {
        point: rec.p,
        normal: material.shading_normal(rec.normal, rec.uv),
        side: rec.side,
    };

    let mut radiance = material.radiance();
    if material.sample_light() {
        radiance += direct_lighting(wo, &outgoing, rec.uv, material, scene, config, rng);
    }

    // Russian roulette
    if gen_f32(rng) < config.survival_probability {
        radiance += indirect_lighting(
            wo,
            &outgoing,
            rec.uv,
            material,
            scene,
            depth,
            transmissions,
            config,
            rng,
        );
    }
    radiance
}

/// Next-event estimation: one sample on every light, with a shadow ray.
pub fn direct_lighting(
    wo: Vec3,
    outgoing: &SurfacePoint,
    uv: Vec2,
    material: &Material,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut total = Color::ZERO;

    for light in scene.lights() {
        let light_sample = light.sample_p(rng);
        let position = material.sample_position(outgoing.normal, outgoing.point, scene, rng);

        let to_light = light_sample.point - position.point;
        let distance_squared = to_light.length_squared();
        if distance_squared <= 0.0 {
            continue;
        }
        let wi = to_light / distance_squared.sqrt();

        if occluded(position.point, light_sample.point, scene, config, rng) {
            continue;
        }

        let side = if position.normal.dot(wi) > 0.0 {
            outgoing.side
        } else {
            outgoing.side.flip()
        };
        let incident = SurfacePoint {
            point: position.point,
            normal: position.normal,
            side,
        };
        let f = material.bsdf(wo, outgoing, uv, wi, &incident);
        let cos_surface = outgoing.normal.dot(wi);
        let cos_light = light_sample.normal.dot(-wi);

        let contribution = light_sample.radiance
            * f
            * (cos_surface * cos_light
                / (distance_squared * light_sample.pdf * position.pdf));
        total += non_negative(contribution);
    }
    total
}

#[allow(clippy::too_many_arguments)]
fn indirect_lighting(
    wo: Vec3,
    outgoing: &SurfacePoint,
    uv: Vec2,
    material: &Material,
    scene: &Scene,
    depth: u32,
    transmissions: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let position = material.sample_position(outgoing.normal, outgoing.point, scene, rng);
    let sample = material.sample_wi(wo, position.normal, outgoing.side, rng);
    if sample.is_invalid() {
        return Color::ZERO;
    }

    let incident = SurfacePoint {
        point: position.point,
        normal: position.normal,
        side: sample.side,
    };
    let f = material.bsdf(wo, outgoing, uv, sample.wi, &incident);
    if f == Color::ZERO {
        return Color::ZERO;
    }

    // A transmission does not count as a bounce
    let (next_depth, next_transmissions) = if sample.side == outgoing.side {
        (depth - 1, 0)
    } else if transmissions < MAX_TRANSMISSIONS {
        (depth, transmissions + 1)
    } else {
        return Color::ZERO;
    };

    let next = bounce_ray(position.point, &sample, material, config.ray_epsilon);
    let incoming = trace(&next, scene, next_depth, next_transmissions, config, rng);

    let cos = bounce_cosine(outgoing.normal, sample.wi, sample.side != outgoing.side);
    let contribution =
        incoming * f * (cos / (sample.pdf * position.pdf * config.survival_probability));
    non_negative(contribution)
}

/// Continuation ray for a sampled bounce, tagged with the medium on the
/// side it enters.
fn bounce_ray(point: Vec3, sample: &DirectionSample, material: &Material, epsilon: f32) -> Ray {
    Ray::new(point + sample.wi * epsilon, sample.wi).with_medium(material.medium(sample.side))
}

/// Cosine weight of a bounce. Transmitted directions sit below the outgoing
/// normal; reflected ones that dip below it carry nothing.
fn bounce_cosine(normal: Vec3, wi: Vec3, crossed: bool) -> f32 {
    let cos = normal.dot(wi);
    if crossed {
        cos.abs()
    } else {
        cos
    }
}

/// True if something opaque lies strictly between `from` and `to`.
///
/// Surfaces are treated with the same stochastic alpha as camera rays, so
/// a fully transparent surface never casts a shadow.
pub fn occluded(
    from: Vec3,
    to: Vec3,
    scene: &dyn Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> bool {
    let eps = config.ray_epsilon;
    let offset = to - from;
    let distance = offset.length();
    if distance <= 2.0 * eps {
        return false;
    }

    let mut ray = Ray::new(from, offset).advance(0.0, eps);
    let mut remaining = distance - 2.0 * eps;
    loop {
        let Some(rec) = scene.hit(&ray, Interval::new(T_MIN, remaining)) else {
            return false;
        };
        if gen_f32(rng) < rec.material.alpha(rec.uv) {
            return true;
        }
        remaining -= rec.t + PASS_THROUGH_OFFSET;
        if remaining <= T_MIN {
            return false;
        }
        ray = ray.advance(rec.t, PASS_THROUGH_OFFSET);
    }
}

/// Clamp to `[0, inf)`, mapping NaN to zero.
#[inline]
fn non_negative(c: Color) -> Color {
    Color::new(c.x.max(0.0), c.y.max(0.0), c.z.max(0.0))
}
