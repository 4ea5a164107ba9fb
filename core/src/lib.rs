//! Feed and rendering core for the Skytrail live position map.
//!
//! The modules mirror the browser client this crate replaces while providing
//! deterministic, UI-free abstractions: wire decoding, color assignment,
//! web-mercator projection, and the overlay/marker render state, all driven
//! through a single event dispatcher.

pub mod app;
pub mod feed;
pub mod map;
pub mod prelude;
pub mod render;
pub mod telemetry;

pub use app::{AppEvent, KeyInput, TrailApp};
pub use prelude::{FeedError, FeedResult, GeoPoint, PixelPoint, PointRecord};
