//! Indexed triangle meshes.
//!
//! Meshes are plain data: the renderer turns each index triple into a
//! triangle primitive. Besides the raw constructor there is a box generator
//! and a scale/rotate/translate transform for placing generated geometry.

use glam::{Quat, Vec2, Vec3};
use lux_math::Aabb;

use crate::error::{MeshError, MeshResult};

/// Vertex positions, optional per-vertex normals and uvs, and triangle
/// indices (every 3 indices form a triangle, counter-clockwise seen from
/// the side the face normal points to).
#[derive(Clone, Debug)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a mesh, checking that indices and attributes line up.
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
    ) -> MeshResult<Self> {
        let vertex_count = positions.len();
        if indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        if let Some(n) = &normals {
            check_attribute("normals", n.len(), vertex_count)?;
        }
        if let Some(uv) = &uvs {
            check_attribute("uvs", uv.len(), vertex_count)?;
        }

        let bounds = Aabb::from_point_cloud(positions.iter().copied());
        Ok(Self {
            positions,
            normals,
            uvs,
            indices,
            bounds,
        })
    }

    /// An axis-aligned box centered at the origin with edge lengths `size`.
    /// Faces wind outward, so their geometric normals point out of the box.
    pub fn cuboid(size: Vec3) -> Self {
        let h = size * 0.5;
        let positions = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 0, 2, 3, // -y
            4, 6, 5, 4, 7, 6, // +y
            0, 4, 5, 0, 5, 1, // -z
            3, 2, 6, 3, 6, 7, // +z
            0, 3, 7, 0, 7, 4, // -x
            1, 5, 6, 1, 6, 2, // +x
        ];
        let bounds = Aabb::from_point_cloud(positions.iter().copied());
        Self {
            positions,
            normals: None,
            uvs: None,
            indices,
            bounds,
        }
    }

    /// Scale, then rotate (radians about x, then y, then z), then translate.
    /// Normals get the inverse scale and the rotation.
    pub fn transformed(mut self, scale: Vec3, rotation: Vec3, translation: Vec3) -> Self {
        let rotate = Quat::from_rotation_z(rotation.z)
            * Quat::from_rotation_y(rotation.y)
            * Quat::from_rotation_x(rotation.x);

        for p in &mut self.positions {
            *p = rotate * (*p * scale) + translation;
        }
        if let Some(normals) = &mut self.normals {
            let inv_scale = scale.recip();
            for n in normals.iter_mut() {
                *n = (rotate * (*n * inv_scale)).normalize_or_zero();
            }
        }
        self.bounds = Aabb::from_point_cloud(self.positions.iter().copied());
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex indices of triangle `i`.
    pub fn triangle(&self, i: usize) -> [usize; 3] {
        let base = i * 3;
        [
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        ]
    }

    /// Total surface area of all triangles.
    pub fn surface_area(&self) -> f32 {
        (0..self.triangle_count())
            .map(|i| {
                let [a, b, c] = self.triangle(i);
                let (p0, p1, p2) = (self.positions[a], self.positions[b], self.positions[c]);
                0.5 * (p1 - p0).cross(p2 - p0).length()
            })
            .sum()
    }
}

fn check_attribute(attribute: &'static str, len: usize, vertex_count: usize) -> MeshResult<()> {
    if len == vertex_count {
        Ok(())
    } else {
        Err(MeshError::AttributeLength {
            attribute,
            len,
            vertex_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn face_normal(mesh: &Mesh, i: usize) -> Vec3 {
        let [a, b, c] = mesh.triangle(i);
        let (p0, p1, p2) = (mesh.positions[a], mesh.positions[b], mesh.positions[c]);
        (p1 - p0).cross(p2 - p0).normalize()
    }

    #[test]
    fn test_new_validates_topology() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];

        assert!(Mesh::new(positions.clone(), vec![0, 1, 2], None, None).is_ok());
        assert_eq!(
            Mesh::new(positions.clone(), vec![0, 1], None, None).unwrap_err(),
            MeshError::RaggedIndices(2)
        );
        assert_eq!(
            Mesh::new(positions.clone(), vec![0, 1, 3], None, None).unwrap_err(),
            MeshError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
        assert!(matches!(
            Mesh::new(positions, vec![0, 1, 2], None, Some(vec![Vec2::ZERO])),
            Err(MeshError::AttributeLength { attribute: "uvs", .. })
        ));
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let mesh = Mesh::cuboid(Vec3::new(2.0, 4.0, 6.0));

        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.bounds.min(), Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.max(), Vec3::new(1.0, 2.0, 3.0));

        for i in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(i);
            let centroid = (mesh.positions[a] + mesh.positions[b] + mesh.positions[c]) / 3.0;
            assert!(
                face_normal(&mesh, i).dot(centroid) > 0.0,
                "triangle {} faces inward",
                i
            );
        }
        assert!((mesh.surface_area() - 2.0 * (8.0 + 24.0 + 12.0)).abs() < 1e-4);
    }

    #[test]
    fn test_transform_order() {
        let mesh = Mesh::cuboid(Vec3::ONE).transformed(
            Vec3::new(2.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, FRAC_PI_2),
            Vec3::new(0.0, 5.0, 0.0),
        );

        // Scaled along x to width 2, then turned onto y, then lifted.
        assert!((mesh.bounds.y.size() - 2.0).abs() < 1e-4);
        assert!((mesh.bounds.x.size() - 1.0).abs() < 1e-4);
        assert!((mesh.bounds.centroid() - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_transform_normals_stay_unit() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = Some(vec![Vec3::Z; 3]);
        let mesh = Mesh::new(positions, vec![0, 1, 2], normals, None)
            .unwrap()
            .transformed(Vec3::new(1.0, 1.0, 3.0), Vec3::new(FRAC_PI_2, 0.0, 0.0), Vec3::ZERO);

        for n in mesh.normals.as_ref().unwrap() {
            assert!((n.length() - 1.0).abs() < 1e-5);
            // z rotated about x by 90 degrees lands on -y
            assert!((*n - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
        }
    }
}
