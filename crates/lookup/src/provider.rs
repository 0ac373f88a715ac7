use foundation::geo::LatLon;
use runtime::future::BoxFuture;
use serde::Deserialize;

use crate::protocol::{Candidate, GeocodeRequest, LocationError, LookupError};

/// Address-to-coordinates service.
pub trait Geocoder: Send + Sync {
    fn describe(&self) -> String;
    fn geocode(&self, request: GeocodeRequest) -> BoxFuture<'_, Result<Vec<Candidate>, LookupError>>;
}

/// Device location service. Each call is one independent attempt.
pub trait LocationProvider: Send + Sync {
    fn current_position(&self) -> BoxFuture<'_, Result<LatLon, LocationError>>;
}

/// Mapbox-compatible forward geocoder:
/// `GET {base}/geocoding/v5/mapbox.places/{query}.json?bbox=..&limit=..&access_token=..`
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    base_url: String,
    access_token: String,
    http: reqwest::Client,
}

impl MapboxGeocoder {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.mapbox.com";

    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            http,
        }
    }

    fn request_url(&self, request: &GeocodeRequest) -> Result<reqwest::Url, LookupError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| LookupError::InvalidEndpoint(format!("{}: {e}", self.base_url)))?;
        let place = format!("{}.json", request.query);
        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidEndpoint(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places", place.as_str()]);

        let b = request.bounds;
        url.query_pairs_mut()
            .append_pair("bbox", &format!("{},{},{},{}", b.min[0], b.min[1], b.max[0], b.max[1]))
            .append_pair("limit", &request.limit.to_string())
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }
}

impl Geocoder for MapboxGeocoder {
    fn describe(&self) -> String {
        format!("mapbox geocoder at {}", self.base_url)
    }

    fn geocode(&self, request: GeocodeRequest) -> BoxFuture<'_, Result<Vec<Candidate>, LookupError>> {
        Box::pin(async move {
            let url = self.request_url(&request)?;
            let response = self.http.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(LookupError::Status(status.as_u16()));
            }
            let body = response.bytes().await?;
            parse_places(&body, request.limit)
        })
    }
}

#[derive(Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<PlaceFeature>,
}

#[derive(Deserialize)]
struct PlaceFeature {
    place_name: String,
    /// `[lon, lat]`
    center: [f64; 2],
}

fn parse_places(body: &[u8], limit: usize) -> Result<Vec<Candidate>, LookupError> {
    let response: PlacesResponse = serde_json::from_slice(body)?;
    Ok(response
        .features
        .into_iter()
        .map(|f| Candidate::new(f.place_name, LatLon::new(f.center[1], f.center[0])))
        .filter(|c| c.position.is_valid())
        .take(limit)
        .collect())
}

/// Used when no geocoding endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGeocoder;

impl Geocoder for DisabledGeocoder {
    fn describe(&self) -> String {
        "disabled geocoder".to_string()
    }

    fn geocode(&self, _request: GeocodeRequest) -> BoxFuture<'_, Result<Vec<Candidate>, LookupError>> {
        Box::pin(std::future::ready(Err(LookupError::Unavailable)))
    }
}

/// Answers every location request with the same result.
#[derive(Debug, Clone)]
pub struct FixedLocation {
    result: Result<LatLon, LocationError>,
}

impl FixedLocation {
    pub fn at(position: LatLon) -> Self {
        Self { result: Ok(position) }
    }

    pub fn failing(err: LocationError) -> Self {
        Self { result: Err(err) }
    }

    /// A host without any location capability.
    pub fn unavailable() -> Self {
        Self::failing(LocationError::position_unavailable())
    }
}

impl LocationProvider for FixedLocation {
    fn current_position(&self) -> BoxFuture<'_, Result<LatLon, LocationError>> {
        Box::pin(std::future::ready(self.result.clone()))
    }
}
