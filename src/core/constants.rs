//! Projection and overlay-service constants.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Spherical Web Mercator radius in metres (EPSG:3857).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Equatorial circumference used by the overlay service's resolution formula.
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_017.0;

/// The overlay service renders 512px vector tiles.
pub const OVERLAY_TILE_SIZE: f64 = 512.0;

/// Latitude beyond which the overlay refuses to draw (inclusive bound).
pub const MAX_OVERLAY_LATITUDE: f64 = 85.0;

/// Deepest zoom the overlay service supports (inclusive bound).
pub const MAX_OVERLAY_ZOOM: f64 = 20.0;

/// Default time to wait for the overlay to become ready before giving up.
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 30_000;
