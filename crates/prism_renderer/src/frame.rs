//! Output frame buffer.

use std::path::Path;

use image::{Rgb, RgbImage};
use prism_math::DVec3;

/// Destination of rendered pixels. `(0, 0)` is the bottom-left pixel.
pub trait PixelSink {
    fn set_color(&mut self, x: u32, y: u32, color: DVec3);

    /// `depth` is already normalized to `[0, 1]`.
    fn set_depth(&mut self, x: u32, y: u32, depth: f64);
}

/// Colour and normalized depth buffers, stored bottom row first.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    color: Vec<DVec3>,
    depth: Vec<f64>,
}

impl Frame {
    /// Black colour and far (1.0) depth everywhere.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![DVec3::ZERO; len],
            depth: vec![1.0; len],
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get_color(&self, x: u32, y: u32) -> Option<DVec3> {
        self.index(x, y).map(|i| self.color[i])
    }

    pub fn get_depth(&self, x: u32, y: u32) -> Option<f64> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// 8-bit colour image, top row first.
    pub fn to_rgb8_color(&self) -> RgbImage {
        self.to_rgb8(|frame, i| frame.color[i])
    }

    /// 8-bit grey depth image, top row first.
    pub fn to_rgb8_depth(&self) -> RgbImage {
        self.to_rgb8(|frame, i| DVec3::splat(frame.depth[i]))
    }

    fn to_rgb8(&self, value: impl Fn(&Self, usize) -> DVec3) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, row| {
            let y = self.height - 1 - row;
            let c = value(self, y as usize * self.width as usize + x as usize);
            Rgb([to_byte(c.x), to_byte(c.y), to_byte(c.z)])
        })
    }

    /// Write the colour buffer; the format follows the file extension.
    pub fn save_color(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_rgb8_color().save(path)
    }

    /// Write the depth buffer; the format follows the file extension.
    pub fn save_depth(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_rgb8_depth().save(path)
    }
}

impl PixelSink for Frame {
    fn set_color(&mut self, x: u32, y: u32, color: DVec3) {
        if let Some(i) = self.index(x, y) {
            self.color[i] = color;
        }
    }

    fn set_depth(&mut self, x: u32, y: u32, depth: f64) {
        if let Some(i) = self.index(x, y) {
            self.depth[i] = depth;
        }
    }
}

#[inline]
fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
