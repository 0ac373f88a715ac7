use std::env;
use std::time::Duration;

use foundation::geo::{GeoBounds, LatLon};

/// Tunables of one exploration session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Dataset location: a file path or an `http(s)://` URL.
    pub dataset: String,
    pub initial_center: LatLon,
    pub initial_zoom: f64,
    /// Zoom used when flying to a picked entity, a chosen address or the user.
    pub focus_zoom: f64,
    pub fly_duration_ms: u64,
    pub search_debounce: Duration,
    pub search_limit: usize,
    /// Area geocoding results are restricted to.
    pub search_bounds: GeoBounds,
    /// Viewports narrower than this get the compact panel.
    pub compact_below_px: f64,
    /// Keeps a focused entity clear of the bottom sheet.
    pub compact_focus_offset_px: [f64; 2],
    /// Keeps a focused entity clear of the side drawer.
    pub wide_focus_offset_px: [f64; 2],
    pub geocoder_url: String,
    pub geocoder_token: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dataset: "data/trees.json".to_string(),
            initial_center: LatLon::new(37.76038462356057, -122.44244459744075),
            initial_zoom: 11.5,
            focus_zoom: 16.0,
            fly_duration_ms: 1000,
            search_debounce: Duration::from_millis(300),
            search_limit: 5,
            search_bounds: GeoBounds::new([-122.5155, 37.7040], [-122.3549, 37.8324]),
            compact_below_px: 600.0,
            compact_focus_offset_px: [0.0, -150.0],
            wide_focus_offset_px: [-180.0, 0.0],
            geocoder_url: "https://api.mapbox.com".to_string(),
            geocoder_token: None,
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `CANOPY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unparseable values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let f64_var = |key: &str, default: f64| env_var_f64(&lookup, key, default);
        let u32_var = |key: &str, default: u32| env_var_u32(&lookup, key, default);

        let debounce_ms = u32_var("CANOPY_DEBOUNCE_MS", d.search_debounce.as_millis() as u32);
        Self {
            dataset: lookup("CANOPY_DATASET").unwrap_or(d.dataset),
            initial_center: LatLon::new(
                f64_var("CANOPY_CENTER_LAT", d.initial_center.lat),
                f64_var("CANOPY_CENTER_LON", d.initial_center.lon),
            ),
            initial_zoom: f64_var("CANOPY_ZOOM", d.initial_zoom),
            focus_zoom: f64_var("CANOPY_FOCUS_ZOOM", d.focus_zoom),
            fly_duration_ms: u64::from(u32_var("CANOPY_FLY_MS", d.fly_duration_ms as u32)),
            search_debounce: Duration::from_millis(u64::from(debounce_ms)),
            search_limit: u32_var("CANOPY_SEARCH_LIMIT", d.search_limit as u32) as usize,
            search_bounds: GeoBounds::new(
                [
                    f64_var("CANOPY_BBOX_MIN_LON", d.search_bounds.min[0]),
                    f64_var("CANOPY_BBOX_MIN_LAT", d.search_bounds.min[1]),
                ],
                [
                    f64_var("CANOPY_BBOX_MAX_LON", d.search_bounds.max[0]),
                    f64_var("CANOPY_BBOX_MAX_LAT", d.search_bounds.max[1]),
                ],
            ),
            compact_below_px: f64_var("CANOPY_COMPACT_BELOW_PX", d.compact_below_px),
            compact_focus_offset_px: d.compact_focus_offset_px,
            wide_focus_offset_px: d.wide_focus_offset_px,
            geocoder_url: lookup("CANOPY_GEOCODER_URL").unwrap_or(d.geocoder_url),
            geocoder_token: lookup("CANOPY_GEOCODER_TOKEN").filter(|t| !t.is_empty()),
        }
    }
}

fn env_var_u32(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_var_f64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    lookup(key)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}
