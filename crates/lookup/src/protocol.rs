//! Request and response types exchanged with the external lookup services.

use foundation::geo::{GeoBounds, LatLon};

/// Forward-geocoding request: free text bounded to one area.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRequest {
    pub query: String,
    pub bounds: GeoBounds,
    pub limit: usize,
}

/// One geocoding match.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Display text; replaces the address query when chosen.
    pub label: String,
    pub position: LatLon,
}

impl Candidate {
    pub fn new(label: impl Into<String>, position: LatLon) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoding service returned HTTP {0}")]
    Status(u16),
    #[error("geocoding response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid geocoding endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("geocoding is not configured")]
    Unavailable,
}

/// Failure reported by the device location provider.
///
/// Code and message come from the provider and are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct LocationError {
    pub code: u16,
    pub message: String,
}

impl LocationError {
    pub const PERMISSION_DENIED: u16 = 1;
    pub const POSITION_UNAVAILABLE: u16 = 2;
    pub const TIMEOUT: u16 = 3;

    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn permission_denied() -> Self {
        Self::new(Self::PERMISSION_DENIED, "User denied Geolocation")
    }

    pub fn position_unavailable() -> Self {
        Self::new(Self::POSITION_UNAVAILABLE, "Position unavailable")
    }
}
