use std::f64::consts::PI;

use crate::map::host::{MapHost, Viewport};
use crate::prelude::{GeoPoint, PixelPoint};

const TILE_SIZE: f64 = 256.0;
const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 19.0;
/// Web-mercator latitude limit; beyond this the projection diverges.
const MAX_LATITUDE: f64 = 85.0511;

/// Viewport-owning web-mercator map: center, zoom, and viewport size, plus
/// the conversion from geographic coordinates to logical viewport pixels.
#[derive(Debug, Clone)]
pub struct WebMercatorMap {
    center: GeoPoint,
    zoom: f64,
    viewport: Viewport,
}

impl WebMercatorMap {
    /// Note the argument order: the map is configured longitude-first, while
    /// the wire format is latitude-first.
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, viewport: Viewport) -> Self {
        Self {
            center: GeoPoint::new(center_lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), center_lon),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            viewport,
        }
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Moves the view by a pixel delta, keeping what is under the screen
    /// center under it after a matching pan of the world.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let (wx, wy) = self.world_position(self.center);
        let world = self.world_size();
        let wx = (wx + dx as f64).rem_euclid(world);
        let wy = (wy + dy as f64).clamp(0.0, world);
        self.center = self.unproject_world(wx, wy);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1.0).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - 1.0).max(MIN_ZOOM);
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    /// Absolute position on the mercator world plane, in pixels at the
    /// current zoom level.
    fn world_position(&self, point: GeoPoint) -> (f64, f64) {
        let world = self.world_size();
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (point.lon + 180.0) / 360.0 * world;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
        (x, y)
    }

    fn unproject_world(&self, x: f64, y: f64) -> GeoPoint {
        let world = self.world_size();
        let lon = x / world * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * y / world);
        let lat = n.sinh().atan().to_degrees();
        GeoPoint::new(lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), lon)
    }
}

impl MapHost for WebMercatorMap {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn project(&self, point: GeoPoint) -> PixelPoint {
        let (x, y) = self.world_position(point);
        let (cx, cy) = self.world_position(self.center);
        PixelPoint {
            x: ((x - cx) + self.viewport.width as f64 / 2.0) as f32,
            y: ((y - cy) + self.viewport.height as f64 / 2.0) as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tbilisi_map() -> WebMercatorMap {
        WebMercatorMap::new(44.78, 41.70, 9.0, Viewport::new(800.0, 600.0, 1.0))
    }

    #[test]
    fn center_projects_to_viewport_middle() {
        let map = tbilisi_map();
        let pixel = map.project(GeoPoint::new(41.70, 44.78));
        assert_relative_eq!(pixel.x, 400.0, epsilon = 1e-3);
        assert_relative_eq!(pixel.y, 300.0, epsilon = 1e-3);
    }

    #[test]
    fn east_is_right_and_north_is_up() {
        let map = tbilisi_map();
        let east = map.project(GeoPoint::new(41.70, 44.90));
        let north = map.project(GeoPoint::new(41.80, 44.78));
        assert!(east.x > 400.0);
        assert!(north.y < 300.0);
    }

    #[test]
    fn pan_keeps_panned_point_under_center() {
        let mut map = tbilisi_map();
        let before = map.project(GeoPoint::new(41.70, 44.78));
        map.pan_by(50.0, -30.0);
        let after = map.project(GeoPoint::new(41.70, 44.78));
        assert_relative_eq!(after.x, before.x - 50.0, epsilon = 1e-3);
        assert_relative_eq!(after.y, before.y + 30.0, epsilon = 1e-3);
    }

    #[test]
    fn zoom_is_clamped_to_supported_range() {
        let mut map = WebMercatorMap::new(0.0, 0.0, 19.0, Viewport::new(100.0, 100.0, 1.0));
        map.zoom_in();
        assert_eq!(map.zoom(), 19.0);
        let mut map = WebMercatorMap::new(0.0, 0.0, 1.0, Viewport::new(100.0, 100.0, 1.0));
        map.zoom_out();
        assert_eq!(map.zoom(), 1.0);
    }

    #[test]
    fn polar_latitudes_are_clamped_not_divergent() {
        let map = tbilisi_map();
        let pole = map.project(GeoPoint::new(90.0, 44.78));
        assert!(pole.y.is_finite());
    }
}
