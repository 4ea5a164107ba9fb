use crate::prelude::{GeoPoint, PixelPoint};

/// On-screen drawing area in logical pixels, plus the device-pixel-ratio
/// scale applied to any backing bitmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            scale: scale.max(1.0),
        }
    }

    /// Backing-store dimensions in physical pixels.
    pub fn physical(&self) -> (u32, u32) {
        (
            (self.width * self.scale).round() as u32,
            (self.height * self.scale).round() as u32,
        )
    }
}

/// Seam between the renderer and whatever owns the viewport.
///
/// The overlay and marker renderers only ever ask two questions: how big is
/// the view, and where does a coordinate land on it. Keeping the interface
/// this small lets tests substitute a fixed linear projection for the real
/// mercator map.
pub trait MapHost {
    fn viewport(&self) -> Viewport;

    /// Projects a geographic coordinate to logical viewport pixels under the
    /// current pan/zoom state. Points outside the view project to positions
    /// outside the viewport bounds rather than failing.
    fn project(&self, point: GeoPoint) -> PixelPoint;
}
