//! Render driver: configuration, framebuffer and the multi-threaded entry
//! points.
//!
//! The image is split into column stripes, one per worker thread. Every
//! pixel gets its own generator seeded from `(seed, pixel index)`, so the
//! result does not depend on the number of threads.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::sampling::{gen_f32, mix_seed};
use crate::stripe::{generate_stripes, render_stripe};
use crate::{ray_color, Camera, Color, Scene};

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Camera samples per pixel
    pub samples_per_pixel: u32,
    /// Bounce budget of each camera path
    pub max_depth: u32,
    /// Worker threads, also the stripe stride
    pub threads: usize,
    /// Base seed for the per-pixel generators
    pub seed: u64,
    /// Russian-roulette survival probability
    pub survival_probability: f32,
    /// Chance that passing through a transparent surface costs a bounce
    pub alpha_depth_probability: f32,
    /// Offset applied to new ray origins to avoid self-intersection
    pub ray_epsilon: f32,
    /// Per-sample radiance clamp, `None` to disable
    pub sample_clamp: Option<f32>,
    /// Radiance of rays that escape the scene
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            samples_per_pixel: 16,
            max_depth: 6,
            threads: 8,
            seed: 0,
            survival_probability: 1.0,
            alpha_depth_probability: 0.1,
            ray_epsilon: 1e-4,
            sample_clamp: Some(1.0),
            background: Color::ZERO,
        }
    }
}

impl RenderConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: &str| Err(RenderError::InvalidConfig(msg.to_string()));

        if self.width == 0 || self.height == 0 {
            return invalid("image size must be non-zero");
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples_per_pixel must be at least 1");
        }
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1");
        }
        if self.threads == 0 {
            return invalid("threads must be at least 1");
        }
        if !(self.survival_probability > 0.0 && self.survival_probability <= 1.0) {
            return invalid("survival_probability must be in (0, 1]");
        }
        if !(0.0..=1.0).contains(&self.alpha_depth_probability) {
            return invalid("alpha_depth_probability must be in [0, 1]");
        }
        if !(self.ray_epsilon > 0.0) {
            return invalid("ray_epsilon must be positive");
        }
        if let Some(clamp) = self.sample_clamp {
            if !(clamp >= 0.0) {
                return invalid("sample_clamp must be non-negative");
            }
        }
        if self.survival_probability < 1.0 {
            log::warn!(
                "Russian roulette enabled with survival probability {}",
                self.survival_probability
            );
        }
        Ok(())
    }
}

/// Linear-RGB render target, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Get the pixel at (x, y), y counted from the top.
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Gamma 2.2, clamp to [0, 0.999] and quantize to 8 bits.
    pub fn to_rgb8(&self) -> image::RgbImage {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            for c in color.to_array() {
                let encoded = c.max(0.0).powf(1.0 / 2.2).clamp(0.0, 0.999);
                bytes.push((256.0 * encoded) as u8);
            }
        }
        // Length matches width * height * 3 by construction
        image::RgbImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| image::RgbImage::new(self.width, self.height))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        self.to_rgb8()
            .save_with_format(path, image::ImageFormat::Png)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Cooperative cancellation flag, checked once per pixel.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Render the whole image.
pub fn render(scene: &Scene, camera: &Camera, config: &RenderConfig) -> RenderResult<Framebuffer> {
    render_with_cancel(scene, camera, config, &CancelToken::new())
}

/// Render the whole image, giving up with [`RenderError::Cancelled`] once
/// `cancel` is set.
pub fn render_with_cancel(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    cancel: &CancelToken,
) -> RenderResult<Framebuffer> {
    config.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let framebuffer = Mutex::new(Framebuffer::new(config.width, config.height));
    let stripes = generate_stripes(config.threads);

    log::info!(
        "Rendering {}x{} at {} spp, depth {}, {} threads",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_depth,
        config.threads
    );
    let start = Instant::now();

    pool.scope(|s| {
        for stripe in &stripes {
            let framebuffer = &framebuffer;
            s.spawn(move |_| render_stripe(stripe, scene, camera, config, framebuffer, cancel));
        }
    });

    if cancel.is_cancelled() {
        log::info!("Render cancelled after {:.2?}", start.elapsed());
        return Err(RenderError::Cancelled);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(framebuffer
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner))
}

/// Average of `samples_per_pixel` clamped samples for pixel `(i, j)`,
/// with `j` counted from the bottom row.
pub fn render_pixel(scene: &Scene, camera: &Camera, i: u32, j: u32, config: &RenderConfig) -> Color {
    let index = (config.height - 1 - j) as u64 * config.width as u64 + i as u64;
    let mut rng = StdRng::seed_from_u64(mix_seed(config.seed, index));

    let u_scale = 1.0 / config.width.saturating_sub(1).max(1) as f32;
    let v_scale = 1.0 / config.height.saturating_sub(1).max(1) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let u = (i as f32 + gen_f32(&mut rng)) * u_scale;
        let v = (j as f32 + gen_f32(&mut rng)) * v_scale;
        let ray = camera.get_ray(u, v);
        let sample = ray_color(&ray, scene, config.max_depth, config, &mut rng);
        pixel_color += match config.sample_clamp {
            Some(max) => sample.clamp(Color::ZERO, Color::splat(max)),
            None => sample.max(Color::ZERO),
        };
    }
    pixel_color / config.samples_per_pixel as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            RenderConfig {
                width: 0,
                ..Default::default()
            },
            RenderConfig {
                threads: 0,
                ..Default::default()
            },
            RenderConfig {
                survival_probability: 0.0,
                ..Default::default()
            },
            RenderConfig {
                alpha_depth_probability: 1.5,
                ..Default::default()
            },
            RenderConfig {
                ray_epsilon: 0.0,
                ..Default::default()
            },
            RenderConfig {
                sample_clamp: Some(-1.0),
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            RenderConfig::from_json(r#"{ "width": 64, "height": 32, "background": [0.5, 0.5, 0.5] }"#)
                .unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.height, 32);
        assert_eq!(config.background, Color::splat(0.5));
        assert_eq!(config.samples_per_pixel, 16);
        assert_eq!(config.sample_clamp, Some(1.0));
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            RenderConfig::from_json("{ width: }"),
            Err(RenderError::Config(_))
        ));
        assert!(matches!(
            RenderConfig::from_json(r#"{ "max_depth": 0 }"#),
            Err(RenderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_framebuffer_get_set() {
        let mut fb = Framebuffer::new(4, 3);
        fb.set(3, 2, Color::ONE);
        assert_eq!(fb.get(3, 2), Color::ONE);
        assert_eq!(fb.pixels()[11], Color::ONE);
        assert_eq!(fb.get(0, 0), Color::ZERO);
    }

    #[test]
    fn test_to_rgb8_gamma_and_clamp() {
        let mut fb = Framebuffer::new(3, 1);
        fb.set(0, 0, Color::new(0.0, -1.0, f32::NAN));
        fb.set(1, 0, Color::splat(5.0));
        fb.set(2, 0, Color::splat(0.5));
        let img = fb.to_rgb8();

        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255]);
        // 0.5^(1/2.2) = 0.7297...
        assert_eq!(img.get_pixel(2, 0).0, [186, 186, 186]);
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
