//! Y-aligned capped cylinder.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::primitive::{azimuth_u, cap_uv, keep_nearest, Candidate};
use crate::{Material, Ray};
use lux_math::{Aabb, Interval, Vec2, Vec3};

const EPSILON: f32 = 1e-12;

/// A cylinder along +Y. `center` is the middle of the axis; the body spans
/// `height / 2` above and below it and is closed by two cap discs.
#[derive(Clone)]
pub struct Cylinder {
    center: Vec3,
    radius: f32,
    height: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Cylinder {
    pub fn new(center: Vec3, radius: f32, height: f32, material: Arc<Material>) -> Self {
        let radius = radius.abs();
        let height = height.abs();
        let half = Vec3::new(radius, height * 0.5, radius);
        Self {
            center,
            radius,
            height,
            material,
            bbox: Aabb::from_points(center - half, center + half),
        }
    }
}

impl Hittable for Cylinder {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let o = ray.origin() - self.center;
        let d = ray.direction();
        let half_h = self.height * 0.5;
        let r2 = self.radius * self.radius;
        let mut best = None;

        // Side wall: x^2 + z^2 = r^2 restricted to |y| <= h/2
        let a = d.x * d.x + d.z * d.z;
        if a > EPSILON {
            let half_b = o.x * d.x + o.z * d.z;
            let c = o.x * o.x + o.z * o.z - r2;
            let discriminant = half_b * half_b - a * c;
            if discriminant >= 0.0 {
                let sqrtd = discriminant.sqrt();
                for t in [(-half_b - sqrtd) / a, (-half_b + sqrtd) / a] {
                    let p = o + t * d;
                    if p.y.abs() <= half_h {
                        let candidate = Candidate {
                            t,
                            outward_normal: Vec3::new(p.x, 0.0, p.z) / self.radius,
                            uv: Vec2::new(azimuth_u(p), (p.y + half_h) / self.height),
                        };
                        keep_nearest(&mut best, candidate, ray_t);
                    }
                }
            }
        }

        // Top and bottom caps
        if d.y.abs() > EPSILON {
            for (cap_y, normal_y) in [(half_h, 1.0), (-half_h, -1.0)] {
                let t = (cap_y - o.y) / d.y;
                let p = o + t * d;
                if p.x * p.x + p.z * p.z <= r2 {
                    let candidate = Candidate {
                        t,
                        outward_normal: Vec3::new(0.0, normal_y, 0.0),
                        uv: cap_uv(p, self.radius),
                    };
                    keep_nearest(&mut best, candidate, ray_t);
                }
            }
        }

        best.map(|c| HitRecord::new(ray, c.t, c.outward_normal, c.uv, &self.material))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Side;

    fn cylinder() -> Cylinder {
        Cylinder::new(
            Vec3::new(0.0, 1.0, 0.0),
            0.5,
            2.0,
            Arc::new(Material::diffuse(Vec3::ONE)),
        )
    }

    fn range() -> Interval {
        Interval::new(1e-4, f32::INFINITY)
    }

    #[test]
    fn test_side_hit() {
        let ray = Ray::new(Vec3::new(-5.0, 1.5, 0.0), Vec3::X);
        let cylinder = cylinder();
        let rec = cylinder.hit(&ray, range()).unwrap();

        assert!((rec.t - 4.5).abs() < 1e-4);
        assert!((rec.normal + Vec3::X).length() < 1e-4);
        assert_eq!(rec.side, Side::Outside);
    }

    #[test]
    fn test_top_cap_hit() {
        let ray = Ray::new(Vec3::new(0.1, 5.0, 0.1), -Vec3::Y);
        let cylinder = cylinder();
        let rec = cylinder.hit(&ray, range()).unwrap();

        assert!((rec.t - 3.0).abs() < 1e-4);
        assert!((rec.normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_bottom_cap_hit() {
        let ray = Ray::new(Vec3::new(0.1, -3.0, 0.0), Vec3::Y);
        let cylinder = cylinder();
        let rec = cylinder.hit(&ray, range()).unwrap();

        assert!((rec.t - 3.0).abs() < 1e-4);
        assert!((rec.p.y - 0.0).abs() < 1e-4);
        assert_eq!(rec.outward_normal(), -Vec3::Y);
    }

    #[test]
    fn test_side_is_clipped_by_height() {
        let above = Ray::new(Vec3::new(-5.0, 2.5, 0.0), Vec3::X);
        assert!(cylinder().hit(&above, range()).is_none());
    }

    #[test]
    fn test_from_inside_hits_wall() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z);
        let cylinder = cylinder();
        let rec = cylinder.hit(&ray, range()).unwrap();

        assert!((rec.t - 0.5).abs() < 1e-4);
        assert_eq!(rec.side, Side::Inside);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = cylinder().bounding_box();
        assert_eq!(bbox.min(), Vec3::new(-0.5, 0.0, -0.5));
        assert_eq!(bbox.max(), Vec3::new(0.5, 2.0, 0.5));
    }
}
