//! Output pixel buffer shared by every tile of a run

use crate::spatial::geometry::{Dimensions, Point, Rect};
use image::{Rgba, RgbaImage, imageops};

/// Transparent RGBA buffer the original image and generated tiles are pasted into
///
/// Pastes overwrite pixels outright; nothing is blended at tile seams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// Allocate a fully transparent canvas
    pub fn new(size: Dimensions) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(size.width, size.height, Rgba([0, 0, 0, 0])),
        }
    }

    /// Canvas size
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.pixels.width(), self.pixels.height())
    }

    /// Overwrite the area under `image` with its pixels, clipped to the canvas
    pub fn paste(&mut self, image: &RgbaImage, at: Point) {
        imageops::replace(&mut self.pixels, image, i64::from(at.x), i64::from(at.y));
    }

    /// Copy out `region`; parts outside the canvas come back transparent
    pub fn crop(&self, region: Rect) -> RgbaImage {
        let width = region.x1.saturating_sub(region.x0);
        let height = region.y1.saturating_sub(region.y0);
        let mut out = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        imageops::replace(
            &mut out,
            &self.pixels,
            -i64::from(region.x0),
            -i64::from(region.y0),
        );
        out
    }

    /// Pixel at `(x, y)`, if inside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    /// Underlying image
    pub const fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consume the canvas, returning the underlying image
    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}
