//! Great-circle distance and the "is the user at the venue" check.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Spherical Earth radius, meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default verification tolerance for reviews, meters.
pub const REVIEW_TOLERANCE_M: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Why a position could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
}

/// Source of the user's current position. One attempt per call; no retries.
pub trait LocationProvider {
    fn current_position(&self) -> Result<Coordinate, GeoError>;
}

/// Haversine distance in meters. No ellipsoid or altitude correction.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Inclusive: exactly `tolerance_m` away counts as within.
pub fn within_tolerance(a: Coordinate, b: Coordinate, tolerance_m: f64) -> bool {
    haversine_m(a, b) <= tolerance_m
}
