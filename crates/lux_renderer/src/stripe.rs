//! Column-stripe work partitioning.
//!
//! Worker `bias` of `stride` owns every column `i` with
//! `i % stride == bias`. Stripes are disjoint, so workers never write the
//! same framebuffer cell.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::renderer::{render_pixel, CancelToken, Framebuffer, RenderConfig};
use crate::{Camera, Scene};

/// An interleaved set of image columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stripe {
    /// First column of the stripe
    pub bias: u32,
    /// Distance between consecutive columns
    pub stride: u32,
}

impl Stripe {
    pub fn new(bias: u32, stride: u32) -> Self {
        Self {
            bias,
            stride: stride.max(1),
        }
    }

    /// Columns of an image `width` pixels wide that belong to this stripe.
    pub fn columns(&self, width: u32) -> impl Iterator<Item = u32> {
        (self.bias..width).step_by(self.stride as usize)
    }

    pub fn pixel_count(&self, width: u32, height: u32) -> u32 {
        self.columns(width).count() as u32 * height
    }
}

/// One stripe per worker thread.
pub fn generate_stripes(threads: usize) -> Vec<Stripe> {
    let stride = threads.max(1) as u32;
    (0..stride).map(|bias| Stripe::new(bias, stride)).collect()
}

/// Render every pixel of `stripe`, top scanline first, writing each
/// finished pixel into `framebuffer`. Returns early once `cancel` is set.
pub fn render_stripe(
    stripe: &Stripe,
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    framebuffer: &Mutex<Framebuffer>,
    cancel: &CancelToken,
) {
    let start = Instant::now();
    let height = config.height;

    for j in (0..height).rev() {
        for i in stripe.columns(config.width) {
            if cancel.is_cancelled() {
                return;
            }
            let color = render_pixel(scene, camera, i, j, config);
            let mut fb = framebuffer.lock().unwrap_or_else(PoisonError::into_inner);
            fb.set(i, height - 1 - j, color);
        }
    }

    log::debug!(
        "Stripe {}/{} ({} pixels) done in {:.2?}",
        stripe.bias,
        stripe.stride,
        stripe.pixel_count(config.width, height),
        start.elapsed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stripes_cover_each_column_once() {
        let width = 37;
        let stripes = generate_stripes(8);
        assert_eq!(stripes.len(), 8);

        let mut seen = vec![0; width as usize];
        for stripe in &stripes {
            for i in stripe.columns(width) {
                assert_eq!(i % 8, stripe.bias);
                seen[i as usize] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_more_threads_than_columns() {
        let stripes = generate_stripes(16);
        let total: u32 = stripes.iter().map(|s| s.pixel_count(4, 2)).sum();
        assert_eq!(total, 8);
        assert_eq!(stripes[10].columns(4).count(), 0);
    }

    #[test]
    fn test_zero_threads_falls_back_to_one() {
        let stripes = generate_stripes(0);
        assert_eq!(stripes, vec![Stripe::new(0, 1)]);
    }
}
