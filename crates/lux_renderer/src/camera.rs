//! Pinhole camera for ray generation.

use crate::Ray;
use lux_math::Vec3;

/// Pinhole camera. `get_ray(u, v)` maps `[0, 1]^2` onto the image plane,
/// with `(0, 0)` at the lower left.
#[derive(Debug, Clone)]
pub struct Camera {
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    /// Vertical field of view in degrees
    vfov: f32,
    aspect_ratio: f32,

    // Cached values, refreshed by every builder call
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Camera at the origin looking down -Z with a 90 degree field of view.
    pub fn new() -> Self {
        let mut camera = Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aspect_ratio: 1.0,
            lower_left_corner: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
        };
        camera.update();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.update();
        self
    }

    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self.update();
        self
    }

    /// Width over height of the image plane.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.update();
        self
    }

    pub fn position(&self) -> Vec3 {
        self.look_from
    }

    fn update(&mut self) {
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * self.aspect_ratio;

        let w = (self.look_from - self.look_at).try_normalize().unwrap_or(Vec3::Z);
        let u = self.vup.cross(w).try_normalize().unwrap_or(Vec3::X);
        let v = w.cross(u);

        self.horizontal = viewport_width * u;
        self.vertical = viewport_height * v;
        self.lower_left_corner = self.look_from - self.horizontal / 2.0 - self.vertical / 2.0 - w;
    }

    /// Ray through screen coordinates `(u, v)`.
    pub fn get_ray(&self, u: f32, v: f32) -> Ray {
        let target = self.lower_left_corner + u * self.horizontal + v * self.vertical;
        Ray::new(self.look_from, target - self.look_from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_looks_at_target() {
        let camera = Camera::new().with_position(
            Vec3::new(0.0, 1.0, 5.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::Y,
        );
        let ray = camera.get_ray(0.5, 0.5);

        assert_eq!(ray.origin(), Vec3::new(0.0, 1.0, 5.0));
        assert!((ray.direction() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_field_of_view_spans_corners() {
        let camera = Camera::new().with_fov(90.0).with_aspect_ratio(2.0);
        let top = camera.get_ray(0.5, 1.0).direction();
        let right = camera.get_ray(1.0, 0.5).direction();

        // Half angle of 45 degrees vertically, tan = 2 horizontally
        assert!((top - Vec3::new(0.0, 1.0, -1.0).normalize()).length() < 1e-5);
        assert!((right - Vec3::new(2.0, 0.0, -1.0).normalize()).length() < 1e-5);
    }
}
