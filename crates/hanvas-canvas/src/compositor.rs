//! Raster compositing of ink trails.
//!
//! The drawing surface is an RGBA8 raster sized to the capture frame. Every
//! frame it is cleared to transparent and all trails are stamped again, so
//! stored point colors never change after the fact but overlaps are always
//! recomputed with whatever blend mode is active now.
//!
//! Blending follows the W3C compositing model for separable blend modes:
//! the source color is first mixed with the backdrop
//! (`Cs' = (1 - ab) * Cs + ab * B(Cb, Cs)`), then composited source-over.

use hanvas_models::{BlendMode, Landmark, PaintColor};
use image::{Rgba, RgbaImage};

use crate::trail::TrailSet;

/// Pixel dimensions of a surface or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Planar distance in pixels between two normalized points.
    pub fn pixel_distance(&self, a: &Landmark, b: &Landmark) -> f64 {
        let dx = (b.x - a.x) * self.width as f64;
        let dy = (b.y - a.y) * self.height as f64;
        dx.hypot(dy)
    }

    /// Normalized point to pixel coordinates.
    pub fn to_pixels(&self, point: &Landmark) -> (f64, f64) {
        (point.x * self.width as f64, point.y * self.height as f64)
    }
}

/// How a stamp combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOp {
    /// Plain painter's order: later stamps cover earlier ones.
    SourceOver,
    /// Separable blend, then source-over.
    Blend(BlendMode),
}

impl CompositeOp {
    /// Operation for the current session toggles.
    pub fn for_session(mixing_enabled: bool, blend_mode: BlendMode) -> Self {
        if mixing_enabled {
            CompositeOp::Blend(blend_mode)
        } else {
            CompositeOp::SourceOver
        }
    }
}

/// Per-channel blend function `B(Cb, Cs)` on unit-range channels.
pub fn blend_channel(mode: BlendMode, backdrop: f64, source: f64) -> f64 {
    match mode {
        BlendMode::Screen => backdrop + source - backdrop * source,
        BlendMode::Multiply => backdrop * source,
        BlendMode::Lighter => (backdrop + source).min(1.0),
    }
}

/// Composite one straight-alpha source pixel over a straight-alpha backdrop.
pub fn composite_pixel(backdrop: [u8; 4], source: [u8; 4], op: CompositeOp) -> [u8; 4] {
    let unit = |v: u8| v as f64 / 255.0;
    let ab = unit(backdrop[3]);
    let as_ = unit(source[3]);

    let ao = as_ + ab * (1.0 - as_);
    if ao <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for channel in 0..3 {
        let cb = unit(backdrop[channel]);
        let mut cs = unit(source[channel]);
        if let CompositeOp::Blend(mode) = op {
            cs = (1.0 - ab) * cs + ab * blend_channel(mode, cb, cs);
        }
        let co = (as_ * cs + ab * cb * (1.0 - as_)) / ao;
        out[channel] = to_byte(co);
    }
    out[3] = to_byte(ao);
    out
}

fn to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// The drawing surface.
#[derive(Debug, Clone)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            image: RgbaImage::new(size.width, size.height),
        }
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.image.width(), self.image.height())
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Match the surface to the frame size. Content is discarded on change.
    pub fn resize(&mut self, size: SurfaceSize) {
        if self.size() != size {
            self.image = RgbaImage::new(size.width, size.height);
        }
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.image.width() && y < self.image.height()).then(|| self.image.get_pixel(x, y).0)
    }

    /// Fill an axis-aligned ellipse centered at pixel `(cx, cy)`.
    ///
    /// A pixel is covered when its center lies inside the ellipse.
    pub fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, color: PaintColor, op: CompositeOp) {
        if rx <= 0.0 || ry <= 0.0 || self.is_empty() {
            return;
        }

        let (width, height) = (self.image.width() as f64, self.image.height() as f64);
        let x0 = (cx - rx).floor().max(0.0) as u32;
        let x1 = (cx + rx).ceil().min(width) as u32;
        let y0 = (cy - ry).floor().max(0.0) as u32;
        let y1 = (cy + ry).ceil().min(height) as u32;

        let source = color.to_array();
        for y in y0..y1 {
            let ny = (y as f64 + 0.5 - cy) / ry;
            for x in x0..x1 {
                let nx = (x as f64 + 0.5 - cx) / rx;
                if nx * nx + ny * ny <= 1.0 {
                    let pixel = self.image.get_pixel_mut(x, y);
                    pixel.0 = composite_pixel(pixel.0, source, op);
                }
            }
        }
    }

    /// Stroke a segment of the given width by stamping discs along it.
    pub fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: PaintColor) {
        let radius = (width / 2.0).max(0.5);
        let length = (to.0 - from.0).hypot(to.1 - from.1);
        let steps = length.ceil().max(1.0) as usize;

        // Stamps along one segment must not blend with each other.
        let source = color.to_array();
        let mut covered = std::collections::HashSet::new();
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let (cx, cy) = (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
            let x0 = (cx - radius).floor().max(0.0) as u32;
            let y0 = (cy - radius).floor().max(0.0) as u32;
            let x1 = (cx + radius).ceil().min(self.image.width() as f64) as u32;
            let y1 = (cy + radius).ceil().min(self.image.height() as f64) as u32;
            for y in y0..y1 {
                for x in x0..x1 {
                    let dx = x as f64 + 0.5 - cx;
                    let dy = y as f64 + 0.5 - cy;
                    if dx * dx + dy * dy <= radius * radius && covered.insert((x, y)) {
                        let pixel = self.image.get_pixel_mut(x, y);
                        pixel.0 = composite_pixel(pixel.0, source, CompositeOp::SourceOver);
                    }
                }
            }
        }
    }
}

/// Clear the surface and stamp every trail point in its stored color.
///
/// Trails are drawn in identity first-seen order, points in trail order.
pub fn render_trails(surface: &mut Surface, trails: &TrailSet, op: CompositeOp) {
    surface.clear();
    let size = surface.size();
    for (_, trail) in trails.iter() {
        for point in trail.points() {
            let (cx, cy) = size.to_pixels(&point.position());
            surface.fill_ellipse(cx, cy, point.radius_x, point.radius_y, point.color, op);
        }
    }
}
