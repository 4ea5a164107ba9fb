use serde::{Deserialize, Serialize};

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components are ordinary numbers (no NaN or infinity).
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Position in logical viewport pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

/// One aircraft position report: mode-S transponder code plus coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub mode_s: String,
    pub position: GeoPoint,
}

impl PointRecord {
    pub fn new(mode_s: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            mode_s: mode_s.into(),
            position: GeoPoint::new(lat, lon),
        }
    }
}

/// Common error type for feed decoding.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("malformed history payload: {0}")]
    MalformedHistory(String),
    #[error("non-finite coordinate for {0}")]
    NonFiniteCoordinate(String),
}

pub type FeedResult<T> = Result<T, FeedError>;
