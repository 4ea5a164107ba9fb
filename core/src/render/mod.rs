pub mod markers;
pub mod overlay;
pub mod palette;

pub use markers::{Marker, MarkerSet, MARKER_TTL};
pub use overlay::OverlayCanvas;
pub use palette::{color_for, identifier_hash, Rgba, PALETTE};
