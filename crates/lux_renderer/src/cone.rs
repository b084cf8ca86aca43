//! Y-aligned cone with a base cap.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::primitive::{azimuth_u, cap_uv, keep_nearest, Candidate};
use crate::{Material, Ray};
use lux_math::{Aabb, Interval, Vec2, Vec3};

const EPSILON: f32 = 1e-12;

/// A cone with its apex at `apex`, opening along +Y when `height > 0` and
/// along -Y when `height < 0`. The base disc sits at `apex.y + height`.
#[derive(Clone)]
pub struct Cone {
    apex: Vec3,
    height: f32,
    /// Radius gained per unit of height
    slope: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Cone {
    pub fn new(apex: Vec3, base_radius: f32, height: f32, material: Arc<Material>) -> Self {
        let base_radius = base_radius.abs();
        let slope = if height.abs() > 0.0 {
            base_radius / height.abs()
        } else {
            0.0
        };
        let bbox = Aabb::from_points(
            apex - Vec3::new(base_radius, 0.0, base_radius),
            apex + Vec3::new(base_radius, height, base_radius),
        );
        Self {
            apex,
            height,
            slope,
            material,
            bbox,
        }
    }

    pub fn base_radius(&self) -> f32 {
        (self.slope * self.height).abs()
    }

    /// True if local height `y` lies between apex and base.
    fn within_height(&self, y: f32) -> bool {
        let s = y / self.height;
        (0.0..=1.0).contains(&s)
    }
}

impl Hittable for Cone {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        if self.height == 0.0 {
            return None;
        }
        let o = ray.origin() - self.apex;
        let d = ray.direction();
        let k2 = self.slope * self.slope;
        let mut best = None;

        // Side: x^2 + z^2 = k^2 y^2
        let a = d.x * d.x + d.z * d.z - k2 * d.y * d.y;
        let half_b = o.x * d.x + o.z * d.z - k2 * o.y * d.y;
        let c = o.x * o.x + o.z * o.z - k2 * o.y * o.y;

        let mut roots = [f32::NAN; 2];
        if a.abs() > EPSILON {
            let discriminant = half_b * half_b - a * c;
            if discriminant >= 0.0 {
                let sqrtd = discriminant.sqrt();
                roots = [(-half_b - sqrtd) / a, (-half_b + sqrtd) / a];
            }
        } else if half_b.abs() > EPSILON {
            // Ray parallel to a generating line: one crossing
            roots[0] = -c / (2.0 * half_b);
        }

        for t in roots.into_iter().filter(|t| t.is_finite()) {
            let p = o + t * d;
            if !self.within_height(p.y) {
                continue;
            }
            let outward_normal = Vec3::new(p.x, -k2 * p.y, p.z)
                .try_normalize()
                .unwrap_or(Vec3::new(0.0, -self.height.signum(), 0.0));
            let candidate = Candidate {
                t,
                outward_normal,
                uv: Vec2::new(azimuth_u(p), p.y / self.height),
            };
            keep_nearest(&mut best, candidate, ray_t);
        }

        // Base cap
        if d.y.abs() > EPSILON {
            let t = (self.height - o.y) / d.y;
            let p = o + t * d;
            let r = self.base_radius();
            if p.x * p.x + p.z * p.z <= r * r {
                let candidate = Candidate {
                    t,
                    outward_normal: Vec3::new(0.0, self.height.signum(), 0.0),
                    uv: cap_uv(p, r),
                };
                keep_nearest(&mut best, candidate, ray_t);
            }
        }

        best.map(|c| HitRecord::new(ray, c.t, c.outward_normal, c.uv, &self.material))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
