//! Ray type for path tracing.
//!
//! Directions are always unit length, so a hit distance `t` is a Euclidean
//! distance and can be compared across every primitive type.

use crate::material::Medium;
use lux_math::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: Vec3,
    /// Unit direction
    direction: Vec3,
    /// Medium the ray travels through, if known. Informational only:
    /// refraction reads its indices from the material interface.
    medium: Option<Medium>,
}

impl Ray {
    /// Create a ray. The direction is normalized here; a zero direction
    /// falls back to +Z.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.try_normalize().unwrap_or(Vec3::Z);
        Self {
            origin,
            direction,
            medium: None,
        }
    }

    /// Tag the ray with the medium it is travelling through.
    #[inline]
    pub fn with_medium(mut self, medium: Medium) -> Self {
        self.medium = Some(medium);
        self
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn medium(&self) -> Option<Medium> {
        self.medium
    }

    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// Continue along the same line from `t`, nudged forward by `epsilon`.
    /// Keeps the medium tag.
    pub fn advance(&self, t: f32, epsilon: f32) -> Ray {
        Ray {
            origin: self.at(t) + self.direction * epsilon,
            ..*self
        }
    }

    /// Geometric ray for the bounding-box slab test.
    #[inline]
    pub fn to_math_ray(&self) -> lux_math::Ray {
        lux_math::Ray::new(self.origin, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0));
        assert!((ray.direction().length() - 1.0).abs() < 1e-6);
        assert!((ray.at(5.0) - Vec3::new(3.0, 0.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_direction_falls_back() {
        let ray = Ray::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(ray.direction(), Vec3::Z);
    }

    #[test]
    fn test_advance_keeps_medium() {
        let glass = Medium::new(1.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::X).with_medium(glass);
        let next = ray.advance(2.0, 0.5);

        assert_eq!(next.origin(), Vec3::new(2.5, 0.0, 0.0));
        assert_eq!(next.direction(), Vec3::X);
        assert_eq!(next.medium(), Some(glass));
        assert_eq!(Ray::new(Vec3::ZERO, Vec3::X).medium(), None);
    }
}
