//! Error taxonomy for user-initiated actions.
//!
//! Every variant is terminal for the action that produced it; callers
//! surface the message and wait for the user to try again.

use thiserror::Error;

use crate::geo::GeoError;

#[derive(Debug, Error)]
pub enum VibeError {
    /// Bad mock credentials or missing signup fields.
    #[error("{0}")]
    Auth(String),

    #[error("failed to verify location: {0}")]
    Geolocation(#[from] GeoError),

    #[error("venue not found: {0}")]
    VenueNotFound(String),

    /// Review author is outside the venue geofence and has no grace left.
    #[error("you must be at the venue to leave a review")]
    NotAtVenue,

    /// Outside the geofence, but the one-time override can still be used.
    #[error("you're not at the venue; confirm to submit this review once without location verification")]
    OverrideAvailable,

    #[error("validation error: {0}")]
    Validation(String),

    /// Backing key-value store failed to read or write.
    #[error("store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, VibeError>;
