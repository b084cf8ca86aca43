//! Scene assembly: primitives into a BVH, plus the light list.

use std::sync::Arc;

use crate::error::RenderResult;
use crate::hittable::{HitRecord, Hittable};
use crate::{Bvh, Light, Material, Primitive, PrimitiveList, Ray, SplitAxis, Triangle};
use lux_core::Mesh;
use lux_math::{Aabb, Interval};

/// A render-ready scene. Immutable once built.
pub struct Scene {
    bvh: Bvh,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new(bvh: Bvh, lights: Vec<Light>) -> Self {
        Self { bvh, lights }
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }
}

impl Hittable for Scene {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.bvh.hit(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.bvh.bounding_box()
    }
}

/// Collects primitives and lights, then builds the acceleration structure.
#[derive(Default)]
pub struct SceneBuilder {
    primitives: PrimitiveList,
    lights: Vec<Light>,
    split: SplitAxis,
    seed: u64,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_primitive(mut self, primitive: impl Into<Primitive>) -> Self {
        self.primitives.add(primitive);
        self
    }

    /// Add every triangle of `mesh` with a shared material.
    pub fn add_mesh(mut self, mesh: &Mesh, material: Arc<Material>) -> Self {
        self.primitives.extend(Triangle::from_mesh(mesh, material));
        self
    }

    pub fn add_light(mut self, light: impl Into<Light>) -> Self {
        self.lights.push(light.into());
        self
    }

    pub fn with_split_axis(mut self, split: SplitAxis) -> Self {
        self.split = split;
        self
    }

    /// Seed for the random split axes.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn build(self) -> RenderResult<Scene> {
        if self.lights.is_empty() {
            log::warn!("Scene has no lights; only emission and background will be visible");
        }
        log::debug!(
            "Building scene: {} primitives, {} lights",
            self.primitive_count(),
            self.lights.len()
        );
        let bvh = build_acceleration_structure(self.primitives, self.split, self.seed)?;
        Ok(Scene::new(bvh, self.lights))
    }
}

/// Build a BVH over `primitives`. Fails with `EmptyScene` for an empty
/// list.
pub fn build_acceleration_structure(
    primitives: PrimitiveList,
    split: SplitAxis,
    seed: u64,
) -> RenderResult<Bvh> {
    Bvh::build(primitives.into_primitives(), split, seed)
}
