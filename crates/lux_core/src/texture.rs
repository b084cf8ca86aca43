//! Color and opacity lookups by surface `uv`.
//!
//! Pixels are stored as linear RGBA floats. Image files are decoded with the
//! `image` crate; color maps go through the sRGB transfer curve, data maps
//! (normal maps) are loaded as-is.

use std::path::Path;

use glam::{Vec2, Vec3};

use crate::error::{TextureError, TextureResult};

/// A texture with pixel data.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,

    /// RGBA per pixel, row-major, first row is the top of the image.
    pub pixels: Vec<[f32; 4]>,

    /// Where the pixels came from (for log messages)
    pub path: String,
}

impl Texture {
    /// Build a texture from raw pixels.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<[f32; 4]>,
        path: impl Into<String>,
    ) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty);
        }
        if pixels.len() != (width as usize) * (height as usize) {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            path: path.into(),
        })
    }

    /// A 1x1 opaque texture. The color is clamped to [0, 1].
    pub fn solid(color: Vec3) -> Self {
        Self::solid_rgba(color, 1.0)
    }

    /// A 1x1 texture with explicit opacity.
    pub fn solid_rgba(color: Vec3, alpha: f32) -> Self {
        let c = color.clamp(Vec3::ZERO, Vec3::ONE);
        Self {
            width: 1,
            height: 1,
            pixels: vec![[c.x, c.y, c.z, alpha.clamp(0.0, 1.0)]],
            path: "<solid>".to_string(),
        }
    }

    /// Load a color texture, converting sRGB-encoded channels to linear.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        load_texture_file(path.as_ref(), srgb_to_linear)
    }

    /// Load a data texture (normal map, masks) without color conversion.
    pub fn load_linear(path: impl AsRef<Path>) -> TextureResult<Self> {
        load_texture_file(path.as_ref(), |v| v as f32 / 255.0)
    }

    /// Bilinearly filtered color at `uv`. Coordinates wrap; `v = 0` is the
    /// bottom row of the image.
    pub fn value(&self, uv: Vec2) -> Vec3 {
        let (x, y) = self.texel_coords(uv);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x.fract();
        let fy = y.fract();

        let rgb = |p: [f32; 4]| Vec3::new(p[0], p[1], p[2]);
        let top = rgb(self.texel(x0, y0)).lerp(rgb(self.texel(x1, y0)), fx);
        let bottom = rgb(self.texel(x0, y1)).lerp(rgb(self.texel(x1, y1)), fx);
        top.lerp(bottom, fy)
    }

    /// Opacity at `uv` (nearest texel), in [0, 1].
    pub fn alpha(&self, uv: Vec2) -> f32 {
        let (x, y) = self.texel_coords(uv);
        let texel = self.texel(x.round() as u32, y.round() as u32);
        texel[3].clamp(0.0, 1.0)
    }

    /// True if every texel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.pixels.iter().all(|p| p[3] >= 1.0)
    }

    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 4]>()
    }

    fn texel_coords(&self, uv: Vec2) -> (f32, f32) {
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);
        (
            u * (self.width as f32 - 1.0),
            (1.0 - v) * (self.height as f32 - 1.0),
        )
    }

    fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or([0.0, 0.0, 0.0, 1.0])
    }
}

fn load_texture_file(path: &Path, decode: impl Fn(u8) -> f32) -> TextureResult<Texture> {
    let img = image::open(path).map_err(|source| TextureError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels: Vec<[f32; 4]> = rgba
        .pixels()
        .map(|p| [decode(p[0]), decode(p[1]), decode(p[2]), p[3] as f32 / 255.0])
        .collect();

    let texture = Texture::from_pixels(width, height, pixels, path.display().to_string())?;
    log::debug!(
        "Loaded texture: {} ({}x{}, {:.1} KB)",
        texture.path,
        width,
        height,
        texture.size_bytes() as f32 / 1024.0
    );
    Ok(texture)
}

/// Convert an sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        // top row: red, green; bottom row: blue, transparent white
        Texture::from_pixels(
            2,
            2,
            vec![
                [1.0, 0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0, 1.0],
                [0.0, 0.0, 1.0, 1.0],
                [1.0, 1.0, 1.0, 0.0],
            ],
            "checker",
        )
        .unwrap()
    }

    #[test]
    fn test_solid_clamps_color() {
        let tex = Texture::solid(Vec3::new(2.0, 0.5, -1.0));
        let c = tex.value(Vec2::new(0.3, 0.7));
        assert_eq!(c, Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(tex.alpha(Vec2::ZERO), 1.0);
        assert!(tex.is_opaque());
    }

    #[test]
    fn test_solid_rgba_alpha() {
        let tex = Texture::solid_rgba(Vec3::ONE, 0.0);
        assert_eq!(tex.alpha(Vec2::new(0.5, 0.5)), 0.0);
        assert!(!tex.is_opaque());
    }

    #[test]
    fn test_corners_and_orientation() {
        let tex = checker();
        // v = 1 is the top row
        let top_left = tex.value(Vec2::new(0.0, 0.999_999));
        assert!((top_left - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-4);
        assert_eq!(tex.value(Vec2::new(0.0, 0.0)), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(tex.alpha(Vec2::new(0.99, 0.01)), 0.0);
        assert_eq!(tex.alpha(Vec2::new(0.01, 0.01)), 1.0);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let tex = checker();
        let c = tex.value(Vec2::new(0.5, 0.5));
        assert!((c - Vec3::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_size_mismatch_is_an_error() {
        let err = Texture::from_pixels(2, 2, vec![[0.0; 4]; 3], "bad").unwrap_err();
        assert!(matches!(err, TextureError::SizeMismatch { len: 3, .. }));
        assert!(matches!(
            Texture::from_pixels(0, 1, vec![], "none"),
            Err(TextureError::Empty)
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Texture::load("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, TextureError::Open { .. }));
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);
        let mid = srgb_to_linear(128);
        assert!(mid > 0.1 && mid < 0.5);
    }
}
