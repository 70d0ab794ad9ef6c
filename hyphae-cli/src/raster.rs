//! Grayscale raster canvas implementing the engine's renderer boundary.
//!
//! Strokes are stamped as runs of filled circles spaced one pixel
//! apart along the segment, which is what gives the grown pattern its
//! continuous, slightly organic line quality.

use glam::Vec2;
use hyphae_core::render::Renderer;
use image::{GrayImage, ImageError, Luma};
use std::path::Path;

const BACKGROUND: Luma<u8> = Luma([255]);
const INK: Luma<u8> = Luma([0]);

/// A square `scale`×`scale` pixel surface addressed in normalized
/// coordinates: positions and radii in `[0, 1]` units are multiplied
/// by `scale` at stamp time.
pub struct Canvas {
    img: GrayImage,
    scale: f32,
    /// One pixel in normalized units; also the stroke stamp spacing.
    unit: f32,
}

impl Canvas {
    pub fn new(scale: u32) -> Self {
        Self {
            img: GrayImage::from_pixel(scale, scale, BACKGROUND),
            scale: scale as f32,
            unit: 1.0 / scale as f32,
        }
    }

    pub fn scale(&self) -> u32 {
        self.img.width()
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.img.get_pixel(x, y).0[0]
    }

    /// Writes the surface as a PNG (format inferred from the path).
    pub fn save(&self, path: &Path) -> Result<(), ImageError> {
        self.img.save(path)
    }

    /// Fills a circle at a normalized position by scanning its pixel
    /// bounding box, clipped to the surface.
    fn stamp(&mut self, pos: Vec2, radius: f32) {
        let cx = pos.x * self.scale;
        let cy = pos.y * self.scale;
        let r = radius * self.scale;
        let r2 = r * r;

        let side = self.img.width() as i64;
        let x_min = ((cx - r).floor() as i64).max(0);
        let x_max = ((cx + r).ceil() as i64).min(side - 1);
        let y_min = ((cy - r).floor() as i64).max(0);
        let y_max = ((cy + r).ceil() as i64).min(side - 1);

        for y in y_min..=y_max {
            for x in x_min..=x_max {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.img.put_pixel(x as u32, y as u32, INK);
                }
            }
        }
    }
}

impl Renderer for Canvas {
    fn draw_stroke(&mut self, from: Vec2, to: Vec2, radius: f32) -> Vec2 {
        let dist = from.distance(to);
        let dir = (to - from).normalize_or_zero();
        let mut i = 0u32;
        loop {
            let travelled = i as f32 * self.unit;
            let pos = from + dir * travelled;
            self.stamp(pos, radius);
            if travelled >= dist {
                return pos;
            }
            i += 1;
        }
    }

    fn draw_circle(&mut self, pos: Vec2, radius: f32) {
        self.stamp(pos, radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_blank() {
        let canvas = Canvas::new(16);
        assert_eq!(canvas.scale(), 16);
        assert!((0..16).all(|y| (0..16).all(|x| canvas.pixel(x, y) == 255)));
    }

    #[test]
    fn draw_circle_inks_the_center_pixel() {
        let mut canvas = Canvas::new(100);
        canvas.draw_circle(Vec2::new(0.5, 0.5), 0.05);

        assert_eq!(canvas.pixel(50, 50), 0);
        // Pixels well outside the circle stay blank.
        assert_eq!(canvas.pixel(10, 10), 255);
    }

    #[test]
    fn draw_stroke_inks_both_endpoints_and_returns_the_last_stamp() {
        let mut canvas = Canvas::new(100);
        let from = Vec2::new(0.2, 0.5);
        let to = Vec2::new(0.6, 0.5);

        let end = canvas.draw_stroke(from, to, 0.02);

        assert_eq!(canvas.pixel(20, 50), 0);
        assert_eq!(canvas.pixel(60, 50), 0);
        assert_eq!(canvas.pixel(40, 50), 0, "midpoint must be stamped too");

        // The final stamp lands at or within one pixel past `to`.
        let overshoot = end.distance(from) - to.distance(from);
        assert!(overshoot >= 0.0);
        assert!(overshoot < 1.0 / 100.0 + f32::EPSILON);
    }

    #[test]
    fn zero_length_stroke_stamps_once_in_place() {
        let mut canvas = Canvas::new(100);
        let pos = Vec2::new(0.5, 0.5);
        let end = canvas.draw_stroke(pos, pos, 0.02);
        assert_eq!(end, pos);
        assert_eq!(canvas.pixel(50, 50), 0);
    }

    #[test]
    fn stamps_near_the_border_are_clipped() {
        let mut canvas = Canvas::new(64);
        canvas.draw_circle(Vec2::new(0.0, 0.0), 0.1);
        assert_eq!(canvas.pixel(0, 0), 0);
    }
}
