//! Transparent trail overlay.
//!
//! The overlay is an RGBA bitmap sized to the viewport times the device
//! pixel ratio. Points are stored geographically, never in pixels, so the
//! only way a stale position is corrected after a pan, zoom, or resize is a
//! full clear-and-replay of the history.

use crate::feed::HistoryStore;
use crate::map::{MapHost, Viewport};
use crate::prelude::PointRecord;
use crate::render::palette::color_for;

/// Side of the painted square in logical pixels.
const POINT_SIZE: f32 = 2.0;

pub struct OverlayCanvas {
    viewport: Viewport,
    width_px: u32,
    height_px: u32,
    pixels: Vec<u8>,
}

impl OverlayCanvas {
    pub fn new(viewport: Viewport) -> Self {
        let (width_px, height_px) = viewport.physical();
        Self {
            viewport,
            width_px,
            height_px,
            pixels: vec![0; (width_px * height_px * 4) as usize],
        }
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }

    /// Raw RGBA backing store, row-major, physical pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Paints one record at its current projection.
    ///
    /// Returns whether anything was painted: projections strictly inside the
    /// logical canvas bounds get a `POINT_SIZE` square scaled by the device
    /// pixel ratio, everything else is skipped silently.
    pub fn draw_point(&mut self, map: &impl MapHost, record: &PointRecord) -> bool {
        let pixel = map.project(record.position);
        let inside = pixel.x > 0.0
            && pixel.x < self.viewport.width
            && pixel.y > 0.0
            && pixel.y < self.viewport.height;
        if !inside {
            return false;
        }

        let color = color_for(&record.mode_s);
        let scale = self.viewport.scale;
        let side = (POINT_SIZE * scale).round().max(1.0) as i64;
        let x0 = (pixel.x * scale).round() as i64 - side / 2;
        let y0 = (pixel.y * scale).round() as i64 - side / 2;

        for y in y0..y0 + side {
            for x in x0..x0 + side {
                if x < 0 || y < 0 || x >= self.width_px as i64 || y >= self.height_px as i64 {
                    continue;
                }
                let offset = ((y as u32 * self.width_px + x as u32) * 4) as usize;
                self.pixels[offset] = color.r;
                self.pixels[offset + 1] = color.g;
                self.pixels[offset + 2] = color.b;
                self.pixels[offset + 3] = color.a;
            }
        }
        true
    }

    /// Clears the canvas, matches the backing store to the map's current
    /// viewport, and replays the entire history in store order.
    ///
    /// Safe to call repeatedly; with unchanged state the output is
    /// pixel-identical.
    pub fn redraw_all(&mut self, map: &impl MapHost, history: &HistoryStore) -> usize {
        self.viewport = map.viewport();
        let (width_px, height_px) = self.viewport.physical();
        self.width_px = width_px;
        self.height_px = height_px;
        self.pixels.clear();
        self.pixels.resize((width_px * height_px * 4) as usize, 0);

        let mut drawn = 0;
        for record in history.iter() {
            if self.draw_point(map, record) {
                drawn += 1;
            }
        }
        drawn
    }

    /// Alpha of the physical pixel at (x, y); 0 means untouched.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixels[((y * self.width_px + x) * 4 + 3) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Viewport;
    use crate::prelude::{GeoPoint, PixelPoint};
    use crate::render::palette::color_for;

    /// Degenerate host: one logical pixel per degree, origin at (0, 0).
    struct LinearMap {
        viewport: Viewport,
    }

    impl MapHost for LinearMap {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn project(&self, point: GeoPoint) -> PixelPoint {
            PixelPoint {
                x: point.lon as f32,
                y: point.lat as f32,
            }
        }
    }

    fn map(scale: f32) -> LinearMap {
        LinearMap {
            viewport: Viewport::new(100.0, 80.0, scale),
        }
    }

    #[test]
    fn in_bounds_point_paints_its_color() {
        let map = map(1.0);
        let mut overlay = OverlayCanvas::new(map.viewport());
        let record = PointRecord::new("AA1111", 40.0, 50.0);

        assert!(overlay.draw_point(&map, &record));
        let color = color_for("AA1111");
        // 2x2 square centered near (50, 40).
        assert_eq!(overlay.alpha_at(50, 40), 0xff);
        let offset = ((40 * overlay.width_px() + 50) * 4) as usize;
        assert_eq!(overlay.pixels()[offset], color.r);
        assert_eq!(overlay.pixels()[offset + 1], color.g);
        assert_eq!(overlay.pixels()[offset + 2], color.b);
    }

    #[test]
    fn out_of_bounds_point_leaves_canvas_unchanged() {
        let map = map(1.0);
        let mut overlay = OverlayCanvas::new(map.viewport());
        let before = overlay.pixels().to_vec();

        assert!(!overlay.draw_point(&map, &PointRecord::new("AA1111", -5.0, 50.0)));
        assert!(!overlay.draw_point(&map, &PointRecord::new("AA1111", 40.0, 150.0)));
        // The boundary itself counts as outside: the check is strict.
        assert!(!overlay.draw_point(&map, &PointRecord::new("AA1111", 0.0, 50.0)));
        assert_eq!(overlay.pixels(), &before[..]);
    }

    #[test]
    fn redraw_all_is_idempotent() {
        let map = map(1.0);
        let mut history = HistoryStore::new();
        history.push(PointRecord::new("AA1111", 40.0, 50.0));
        history.push(PointRecord::new("BB2222", 10.0, 20.0));

        let mut overlay = OverlayCanvas::new(map.viewport());
        overlay.redraw_all(&map, &history);
        let first = overlay.pixels().to_vec();
        overlay.redraw_all(&map, &history);
        assert_eq!(overlay.pixels(), &first[..]);
    }

    #[test]
    fn incremental_and_full_redraw_agree() {
        let map = map(1.0);
        let records = [
            PointRecord::new("AA1111", 40.0, 50.0),
            PointRecord::new("BB2222", 10.0, 20.0),
            PointRecord::new("CC3333", 41.0, 51.0),
        ];

        let mut incremental = OverlayCanvas::new(map.viewport());
        let mut history = HistoryStore::new();
        for record in &records {
            history.push(record.clone());
            incremental.draw_point(&map, record);
        }

        let mut full = OverlayCanvas::new(map.viewport());
        full.redraw_all(&map, &history);
        assert_eq!(incremental.pixels(), full.pixels());
    }

    #[test]
    fn redraw_resizes_backing_store_to_scaled_viewport() {
        let mut map = map(2.0);
        let mut overlay = OverlayCanvas::new(map.viewport());
        assert_eq!((overlay.width_px(), overlay.height_px()), (200, 160));

        map.viewport = Viewport::new(50.0, 40.0, 2.0);
        let mut history = HistoryStore::new();
        history.push(PointRecord::new("AA1111", 20.0, 25.0));
        let drawn = overlay.redraw_all(&map, &history);
        assert_eq!((overlay.width_px(), overlay.height_px()), (100, 80));
        assert_eq!(drawn, 1);
        // Scaled square: physical location doubles with the pixel ratio.
        assert_eq!(overlay.alpha_at(50, 40), 0xff);
    }
}
