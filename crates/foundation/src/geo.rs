/// WGS84 position in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        LatLon { lat, lon }
    }

    /// Finite and inside the WGS84 latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// `[lon, lat]` ordering, as used by GeoJSON and most map engines.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Axis-aligned geographic bounding box.
///
/// Corners are stored as `[lon, lat]` pairs. Boxes crossing the antimeridian
/// are not supported.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl GeoBounds {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        GeoBounds { min, max }
    }

    /// Builds a box from two arbitrary corners.
    pub fn from_corners(a: LatLon, b: LatLon) -> Self {
        GeoBounds {
            min: [a.lon.min(b.lon), a.lat.min(b.lat)],
            max: [a.lon.max(b.lon), a.lat.max(b.lat)],
        }
    }

    pub fn contains(&self, p: LatLon) -> bool {
        p.lon >= self.min[0] && p.lon <= self.max[0] && p.lat >= self.min[1] && p.lat <= self.max[1]
    }

    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[0] + self.max[0]) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoBounds, LatLon};

    #[test]
    fn bounds_contain_their_corners_and_center() {
        let b = GeoBounds::from_corners(LatLon::new(37.83, -122.35), LatLon::new(37.70, -122.52));
        assert_eq!(b.min, [-122.52, 37.70]);
        assert!(b.contains(LatLon::new(37.70, -122.52)));
        assert!(b.contains(b.center()));
        assert!(!b.contains(LatLon::new(40.0, -122.4)));
    }

    #[test]
    fn rejects_out_of_range_positions() {
        assert!(LatLon::new(37.7, -122.4).is_valid());
        assert!(!LatLon::new(91.0, 0.0).is_valid());
        assert!(!LatLon::new(f64::NAN, 0.0).is_valid());
    }
}
