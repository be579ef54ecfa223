pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Cruise speed of the aerial vehicle.
pub const CRUISE_SPEED_KMH: f64 = 250.0;

pub const CURVE_HEIGHT_FACTOR: f64 = 0.2;
pub const AERIAL_PATH_STEPS: usize = 50;
pub const BEARING_LOOKAHEAD: f64 = 0.01;

pub const MARKER_PERIOD_MS: f64 = 10_000.0;
pub const REVEAL_DURATION_MS: f64 = 5_000.0;

pub const FIT_PADDING_PX: f64 = 80.0;
pub const FIT_PITCH_DEG: f64 = 45.0;
pub const FIT_DURATION_MS: u32 = 1_500;

pub const TERRAIN_EXAGGERATION: f64 = 1.5;
pub const BASEMAP_DIM_OPACITY: f64 = 0.35;

pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_COUNTRY: &str = "in";
pub const DEFAULT_STYLE_URL: &str = "mapbox://styles/mapbox/dark-v11";

// Default region the camera flies to on load (central India)
pub const DEFAULT_CENTER_LNG: f64 = 78.9629;
pub const DEFAULT_CENTER_LAT: f64 = 20.5937;
pub const DEFAULT_ZOOM: f64 = 4.5;
pub const DEFAULT_PITCH_DEG: f64 = 50.0;
pub const DEFAULT_FLY_DURATION_MS: u32 = 4_000;
