mod geo_point;
mod geo_region;
mod provider;
mod zoom_level;

pub use geo_point::GeoPoint;
pub use geo_region::GeoRegion;
pub use provider::Provider;
pub use zoom_level::{MAX_ZOOM, MIN_ZOOM, ZoomLevel};
