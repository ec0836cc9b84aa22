use vibemap_core::{Coordinate, GeoError, LocationProvider};

/// Position from `--lat/--lng` or `$VIBEMAP_LOCATION` ("lat,lng").
#[derive(Debug, Clone, Copy)]
pub enum CliLocation {
    Fixed(Coordinate),
    /// Nothing supplied; behaves like a denied permission prompt.
    Denied,
}

impl CliLocation {
    pub fn resolve(lat: Option<f64>, lng: Option<f64>) -> Self {
        if let (Some(lat), Some(lng)) = (lat, lng) {
            return CliLocation::Fixed(Coordinate::new(lat, lng));
        }
        std::env::var("VIBEMAP_LOCATION")
            .ok()
            .and_then(|s| parse_lat_lng(&s))
            .map(CliLocation::Fixed)
            .unwrap_or(CliLocation::Denied)
    }
}

impl LocationProvider for CliLocation {
    fn current_position(&self) -> Result<Coordinate, GeoError> {
        match self {
            CliLocation::Fixed(c) => Ok(*c),
            CliLocation::Denied => Err(GeoError::PermissionDenied),
        }
    }
}

fn parse_lat_lng(s: &str) -> Option<Coordinate> {
    let (lat, lng) = s.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)).then(|| Coordinate::new(lat, lng))
}
