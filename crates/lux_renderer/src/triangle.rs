//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable, Side};
use crate::{Material, Ray};
use lux_core::Mesh;
use lux_math::{Aabb, Interval, Vec2, Vec3};

const PARALLEL_EPSILON: f32 = 1e-8;

#[derive(Clone)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Unit face normal from the winding order
    normal: Vec3,
    /// Per-vertex shading normals, if smooth shaded
    vertex_normals: Option<[Vec3; 3]>,
    uvs: [Vec2; 3],
    material: Arc<Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a flat-shaded triangle. Without explicit uvs the hit `uv` is
    /// the barycentric pair of `v1` and `v2`.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        // Flat triangles get a padded box from Aabb::from_points
        let bbox = Aabb::from_point_cloud([v0, v1, v2]);

        Self {
            v0,
            v1,
            v2,
            normal,
            vertex_normals: None,
            uvs: [Vec2::ZERO, Vec2::X, Vec2::Y],
            material,
            bbox,
        }
    }

    pub fn with_uvs(mut self, uvs: [Vec2; 3]) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn with_vertex_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.vertex_normals = Some(normals.map(|n| n.normalize_or_zero()));
        self
    }

    /// One triangle per index triple, sharing `material`.
    pub fn from_mesh(mesh: &Mesh, material: Arc<Material>) -> Vec<Triangle> {
        (0..mesh.triangle_count())
            .map(|i| {
                let [a, b, c] = mesh.triangle(i);
                let mut tri = Triangle::new(
                    mesh.positions[a],
                    mesh.positions[b],
                    mesh.positions[c],
                    material.clone(),
                );
                if let Some(uvs) = &mesh.uvs {
                    tri = tri.with_uvs([uvs[a], uvs[b], uvs[c]]);
                }
                if let Some(normals) = &mesh.normals {
                    tri = tri.with_vertex_normals([normals[a], normals[b], normals[c]]);
                }
                tri
            })
            .collect()
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn area(&self) -> f32 {
        0.5 * (self.v1 - self.v0).cross(self.v2 - self.v0).length()
    }
}

impl Hittable for Triangle {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to the triangle plane
        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let b1 = f * s.dot(h);
        if !(0.0..=1.0).contains(&b1) {
            return None;
        }

        let q = s.cross(edge1);
        let b2 = f * ray.direction().dot(q);
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        let b0 = 1.0 - b1 - b2;
        let uv = self.uvs[0] * b0 + self.uvs[1] * b1 + self.uvs[2] * b2;
        let mut rec = HitRecord::new(ray, t, self.normal, uv, &self.material);

        if let Some([n0, n1, n2]) = self.vertex_normals {
            if let Some(shading) = (n0 * b0 + n1 * b1 + n2 * b2).try_normalize() {
                rec.normal = match rec.side {
                    Side::Outside => shading,
                    Side::Inside => -shading,
                };
            }
        }

        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material() -> Arc<Material> {
        Arc::new(Material::diffuse(Vec3::splat(0.5)))
    }

    fn xy_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            material(),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let tri = xy_triangle();
        let rec = tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        assert!((rec.t - 1.0).abs() < 1e-5);
        assert_eq!(rec.side, Side::Outside);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_triangle_back_face() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let tri = xy_triangle();
        let rec = tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        assert_eq!(rec.side, Side::Inside);
        assert!((rec.normal + Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        let away = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(xy_triangle().hit(&away, Interval::new(0.001, f32::INFINITY)).is_none());

        let outside = Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(xy_triangle().hit(&outside, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_axis_aligned_triangle_box_has_thickness() {
        let tri = xy_triangle();
        let bbox = tri.bounding_box();
        assert!(bbox.z.size() > 0.0);
        assert!(bbox.z.contains(-1.0));

        // A ray grazing the box still reaches the triangle
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
        assert!(bbox.hit(&ray.to_math_ray(), Interval::new(0.001, f32::INFINITY)));
    }

    #[test]
    fn test_uv_interpolation() {
        let tri = xy_triangle().with_uvs([Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.5, 1.0)]);
        let ray = Ray::new(Vec3::new(0.0, 1.0 - 1e-3, 0.0), -Vec3::Z);
        let rec = tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.uv - Vec2::new(0.5, 1.0)).length() < 1e-2);
    }

    #[test]
    fn test_vertex_normals_follow_side() {
        let tilted = Vec3::new(0.0, 0.3, 1.0).normalize();
        let tri = xy_triangle().with_vertex_normals([tilted; 3]);

        let front = Ray::new(Vec3::ZERO, -Vec3::Z);
        let rec = tri.hit(&front, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.normal - tilted).length() < 1e-5);

        let back = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let rec = tri.hit(&back, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.normal + tilted).length() < 1e-5);
    }

    #[test]
    fn test_from_mesh() {
        let mesh = Mesh::cuboid(Vec3::ONE);
        let tris = Triangle::from_mesh(&mesh, material());
        assert_eq!(tris.len(), 12);
        let area: f32 = tris.iter().map(|t| t.area()).sum();
        assert!((area - 6.0).abs() < 1e-4);
    }
}
