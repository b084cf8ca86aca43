//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Primitive, Ray};
use lux_math::{Aabb, Interval, Vec2, Vec3};

/// Which side of a surface a direction (and so a ray) is on.
///
/// `Outside` is the side the outward geometric normal points to. Materials
/// use it to pick the refractive medium a ray is travelling through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Outside,
    Inside,
}

impl Side {
    pub fn flip(self) -> Side {
        match self {
            Side::Outside => Side::Inside,
            Side::Inside => Side::Outside,
        }
    }

    /// Side a ray travelling along `direction` comes from when it meets a
    /// surface with the given outward normal.
    pub fn of_incoming(direction: Vec3, outward_normal: Vec3) -> Side {
        if direction.dot(outward_normal) < 0.0 {
            Side::Outside
        } else {
            Side::Inside
        }
    }
}

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Unit shading normal, always on the side the ray came from
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
    /// Surface parametric coordinates
    pub uv: Vec2,
    /// Distance along the (unit-direction) ray
    pub t: f32,
    /// Side of the surface the ray arrived from
    pub side: Side,
}

impl<'a> HitRecord<'a> {
    /// Build a record, orienting the normal against the ray.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, uv: Vec2, material: &'a Material) -> Self {
        let side = Side::of_incoming(ray.direction(), outward_normal);
        let normal = match side {
            Side::Outside => outward_normal,
            Side::Inside => -outward_normal,
        };
        Self {
            p: ray.at(t),
            normal,
            material,
            uv,
            t,
            side,
        }
    }

    /// The normal pointing to the outside of the surface.
    pub fn outward_normal(&self) -> Vec3 {
        match self.side {
            Side::Outside => self.normal,
            Side::Inside => -self.normal,
        }
    }
}

/// Anything a ray can intersect.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` strictly inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Box containing the whole object.
    fn bounding_box(&self) -> Aabb;
}

/// A flat list of primitives, tested one after another.
///
/// Scenes are assembled into a list and then handed to the BVH builder; the
/// list also serves as the brute-force reference the BVH must agree with.
pub struct PrimitiveList {
    primitives: Vec<Primitive>,
    bbox: Aabb,
}

impl PrimitiveList {
    pub fn new() -> Self {
        Self {
            primitives: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    pub fn add(&mut self, primitive: impl Into<Primitive>) {
        let primitive = primitive.into();
        self.bbox = Aabb::surrounding(&self.bbox, &primitive.bounding_box());
        self.primitives.push(primitive);
    }

    pub fn extend<I, P>(&mut self, primitives: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<Primitive>,
    {
        for p in primitives {
            self.add(p);
        }
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn into_primitives(self) -> Vec<Primitive> {
        self.primitives
    }
}

impl Default for PrimitiveList {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Primitive>> for PrimitiveList {
    fn from(primitives: Vec<Primitive>) -> Self {
        let bbox = primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bounding_box()));
        Self { primitives, bbox }
    }
}

impl Hittable for PrimitiveList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;
        for primitive in &self.primitives {
            let range = closest.as_ref().map_or(ray_t, |h| ray_t.with_max(h.t));
            if let Some(rec) = primitive.hit(ray, range) {
                closest = Some(rec);
            }
        }
        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
