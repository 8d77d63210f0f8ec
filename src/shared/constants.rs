// =============================================================================
// GEO CONSTANTS
// =============================================================================

/// Mean Earth radius in kilometers (haversine sphere)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Degrees of latitude per kilometer (1° ≈ 111 km)
pub const DEGREES_PER_KM: f64 = 0.009;

// =============================================================================
// SEARCH DEFAULTS
// =============================================================================

/// Default radius for the nearby parking lots search
pub const DEFAULT_LOT_RADIUS_KM: f64 = 10.0;

/// Default result cap for the nearby parking lots search
pub const DEFAULT_LOT_MAX_RESULTS: usize = 20;

/// Default radius for the nearby available spots search
pub const DEFAULT_SPOT_RADIUS_KM: f64 = 5.0;

/// Default result cap for the nearby available spots search
pub const DEFAULT_SPOT_MAX_RESULTS: usize = 50;

/// Spot searches over-fetch lots by this factor before collecting spots
pub const SPOT_SEARCH_LOT_FACTOR: usize = 2;

/// Number of spots returned by the driver-facing recommendation view
pub const RECOMMENDATION_LIMIT: usize = 10;
