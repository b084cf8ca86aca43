//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in one arena and address their children by index, so the
//! finished tree is a flat, immutable value that every render thread can
//! borrow without locking.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{RenderError, RenderResult};
use crate::hittable::{HitRecord, Hittable};
use crate::{Primitive, Ray};
use lux_math::{Aabb, Interval};

/// How a node chooses the axis it sorts its primitives along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitAxis {
    /// Uniformly random axis per node
    #[default]
    Random,
    /// Axis of greatest extent of the node's box
    Longest,
}

/// A child slot of a [`BvhNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhChild {
    /// Index into [`Bvh::primitives`]
    Primitive(usize),
    /// Index into [`Bvh::nodes`]
    Node(usize),
}

/// Internal node with exactly two children.
///
/// A node built over a single primitive has both children pointing at it.
#[derive(Debug, Clone, Copy)]
pub struct BvhNode {
    pub left: BvhChild,
    pub right: BvhChild,
    /// Union of the two children's boxes
    pub bbox: Aabb,
}

/// Arena BVH over an owned primitive list.
pub struct Bvh {
    primitives: Vec<Primitive>,
    nodes: Vec<BvhNode>,
    root: usize,
}

impl Bvh {
    /// Build a tree over `primitives`.
    ///
    /// `seed` drives the random axis choice so builds are reproducible.
    pub fn build(primitives: Vec<Primitive>, split: SplitAxis, seed: u64) -> RenderResult<Self> {
        if primitives.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let start = std::time::Instant::now();
        let boxes: Vec<Aabb> = primitives.iter().map(|p| p.bounding_box()).collect();
        let mut order: Vec<usize> = (0..primitives.len()).collect();
        let mut builder = Builder {
            boxes: &boxes,
            nodes: Vec::with_capacity(primitives.len()),
            split,
            rng: StdRng::seed_from_u64(seed),
        };
        let root = builder.build(&mut order);
        let nodes = builder.nodes;

        let bvh = Self {
            primitives,
            nodes,
            root,
        };
        log::info!(
            "Built BVH: {} primitives, {} nodes, depth {} in {:.2?}",
            bvh.primitives.len(),
            bvh.nodes.len(),
            bvh.depth(),
            start.elapsed()
        );
        Ok(bvh)
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Box of a child slot.
    pub fn child_bbox(&self, child: BvhChild) -> Aabb {
        match child {
            BvhChild::Primitive(i) => self.primitives[i].bounding_box(),
            BvhChild::Node(i) => self.nodes[i].bbox,
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            let node = &self.nodes[index];
            for child in [node.left, node.right] {
                if let BvhChild::Node(i) = child {
                    stack.push((i, depth + 1));
                }
            }
        }
        max_depth
    }

    fn hit_child(
        &self,
        child: BvhChild,
        ray: &Ray,
        math_ray: &lux_math::Ray,
        ray_t: Interval,
    ) -> Option<HitRecord<'_>> {
        match child {
            BvhChild::Primitive(i) => self.primitives[i].hit(ray, ray_t),
            BvhChild::Node(i) => self.hit_node(i, ray, math_ray, ray_t),
        }
    }

    fn hit_node(
        &self,
        index: usize,
        ray: &Ray,
        math_ray: &lux_math::Ray,
        ray_t: Interval,
    ) -> Option<HitRecord<'_>> {
        let node = &self.nodes[index];
        if !node.bbox.hit(math_ray, ray_t) {
            return None;
        }

        let left = self.hit_child(node.left, ray, math_ray, ray_t);
        // Only check right up to closest hit
        let right_max = left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let right = self.hit_child(node.right, ray, math_ray, ray_t.with_max(right_max));

        right.or(left)
    }
}

impl Hittable for Bvh {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.hit_node(self.root, ray, &ray.to_math_ray(), ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.nodes[self.root].bbox
    }
}

struct Builder<'a> {
    boxes: &'a [Aabb],
    nodes: Vec<BvhNode>,
    split: SplitAxis,
    rng: StdRng,
}

impl Builder<'_> {
    /// Build a node over `order` (indices into the primitive list) and
    /// return its arena index.
    fn build(&mut self, order: &mut [usize]) -> usize {
        let axis = self.pick_axis(order);

        let (left, right) = match order.len() {
            1 => (BvhChild::Primitive(order[0]), BvhChild::Primitive(order[0])),
            2 => {
                let (a, b) = (order[0], order[1]);
                if self.key(a, axis) <= self.key(b, axis) {
                    (BvhChild::Primitive(a), BvhChild::Primitive(b))
                } else {
                    (BvhChild::Primitive(b), BvhChild::Primitive(a))
                }
            }
            n => {
                order.sort_unstable_by(|&a, &b| self.key(a, axis).total_cmp(&self.key(b, axis)));
                let (lo, hi) = order.split_at_mut(n / 2);
                (BvhChild::Node(self.build(lo)), BvhChild::Node(self.build(hi)))
            }
        };

        let bbox = Aabb::surrounding(&self.child_bbox(left), &self.child_bbox(right));
        self.nodes.push(BvhNode { left, right, bbox });
        self.nodes.len() - 1
    }

    fn pick_axis(&mut self, order: &[usize]) -> usize {
        match self.split {
            SplitAxis::Random => self.rng.gen_range(0..3),
            SplitAxis::Longest => order
                .iter()
                .fold(Aabb::EMPTY, |acc, &i| Aabb::surrounding(&acc, &self.boxes[i]))
                .longest_axis(),
        }
    }

    /// Sort key: box minimum along `axis`.
    fn key(&self, primitive: usize, axis: usize) -> f32 {
        self.boxes[primitive].axis_interval(axis).min
    }

    fn child_bbox(&self, child: BvhChild) -> Aabb {
        match child {
            BvhChild::Primitive(i) => self.boxes[i],
            BvhChild::Node(i) => self.nodes[i].bbox,
        }
    }
}
