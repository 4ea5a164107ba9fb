pub mod host;
pub mod mercator;

pub use host::{MapHost, Viewport};
pub use mercator::WebMercatorMap;
