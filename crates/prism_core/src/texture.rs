//! Albedo textures and the cache that loads them.
//!
//! Images are decoded once through the `image` crate, converted to linear
//! RGB and shared between materials via `Arc`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use prism_math::DVec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded texture in linear RGB.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,

    /// Row-major, top row first (image order)
    pub pixels: Vec<[f32; 3]>,

    /// Source file (for logging)
    pub path: String,
}

impl Texture {
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 3]>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// A 1x1 texture of a single colour.
    pub fn solid_color(color: DVec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color.as_vec3().to_array()],
            path: "<solid>".to_string(),
        }
    }

    /// Bilinear sample at `(u, v)`, wrapping outside [0, 1].
    ///
    /// (0, 0) is the bottom-left of the image.
    pub fn sample(&self, u: f64, v: f64) -> DVec3 {
        if self.width == 0 || self.height == 0 {
            return DVec3::ZERO;
        }

        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        let x = u * (self.width as f64 - 1.0);
        let y = (1.0 - v) * (self.height as f64 - 1.0);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let top = self.pixel(x0, y0).lerp(self.pixel(x1, y0), fx);
        let bottom = self.pixel(x0, y1).lerp(self.pixel(x1, y1), fx);

        top.lerp(bottom, fy)
    }

    fn pixel(&self, x: u32, y: u32) -> DVec3 {
        let idx = (y * self.width + x) as usize;
        self.pixels
            .get(idx)
            .map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64))
            .unwrap_or(DVec3::ZERO)
    }

    /// Approximate memory footprint.
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 3]>()
    }
}

/// Loads textures on demand and hands out shared references.
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: HashMap<String, Arc<Texture>>,

    /// Relative paths are resolved against this directory
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using the cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(path.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f64 / 1024.0
        );

        Ok(texture)
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.textures.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        match &self.base_dir {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    if !path.exists() {
        return Err(TextureError::LoadError(format!(
            "{} does not exist",
            path.display()
        )));
    }

    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    let pixels = rgb
        .pixels()
        .map(|p| {
            [
                srgb_to_linear(p[0]),
                srgb_to_linear(p[1]),
                srgb_to_linear(p[2]),
            ]
        })
        .collect();

    Ok(Texture::new(
        width,
        height,
        pixels,
        path.to_string_lossy().to_string(),
    ))
}

/// Convert an sRGB byte to linear float.
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

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(DVec3::new(1.0, 0.5, 0.0));
        assert_eq!(tex.width, 1);
        assert_eq!(tex.height, 1);

        let sample = tex.sample(0.5, 0.5);
        assert!((sample.x - 1.0).abs() < 0.001);
        assert!((sample.y - 0.5).abs() < 0.001);
        assert!(sample.z.abs() < 0.001);
    }

    #[test]
    fn test_sample_v_is_flipped() {
        // Top row red, bottom row blue (image order)
        let tex = Texture::new(1, 2, vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]], "test");

        let bottom = tex.sample(0.0, 0.0);
        let top = tex.sample(0.0, 0.999);

        assert!((bottom - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-6);
        assert!(top.x > 0.99, "v=1 should sample the top row, got {:?}", top);
    }

    #[test]
    fn test_sample_bilinear_midpoint() {
        let tex = Texture::new(2, 1, vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]], "test");
        let mid = tex.sample(0.5, 0.5);

        assert!((mid.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_texture_file() {
        let mut cache = TextureCache::with_base_dir("/definitely/not/here");
        let result = cache.load("missing.png");

        assert!(matches!(result, Err(TextureError::LoadError(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_texture_cache_reuses_loaded_image() {
        let dir = std::env::temp_dir().join(format!("prism_tex_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("checker.png");
        image::RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255]))
            .save(&file)
            .unwrap();

        let mut cache = TextureCache::with_base_dir(&dir);
        let first = cache.load("checker.png").unwrap();
        let second = cache.load("checker.png").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.is_cached("checker.png"));
        assert_eq!(cache.len(), 1);
        assert!((first.sample(0.25, 0.25).x - 1.0).abs() < 1e-6);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!(srgb_to_linear(0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
