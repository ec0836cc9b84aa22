//! Vibe scores and aggregation.
//!
//! Vibe historically lived on two scales: a legacy 1-10 rating and the
//! current 0-5 one. `normalize` is the single place the two meet; everything
//! stored in a [`Vibe`] is already on the 0-5 scale.

use serde::{Deserialize, Serialize};

use crate::venue::Venue;

/// Upper bound of the current scale.
pub const VIBE_MAX: f64 = 5.0;

/// Map a raw rating onto the 0-5 scale.
///
/// Values above 5 are legacy 1-10 ratings and rescale via `(v - 1) / 2`.
pub fn normalize(raw: f64) -> f64 {
    if raw > VIBE_MAX { (raw - 1.0) / 2.0 } else { raw }
}

/// Snap to the nearest 0.5 for display.
pub fn round_half(x: f64) -> f64 {
    (x * 2.0).round() / 2.0
}

/// A vibe on the current 0-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vibe(f64);

impl Vibe {
    /// Migrate a raw rating of unknown scale.
    pub fn from_raw(raw: f64) -> Self {
        Vibe(normalize(raw).clamp(0.0, VIBE_MAX))
    }

    /// Wrap a value already on the 0-5 scale.
    pub fn normalized(value: f64) -> Self {
        Vibe(value.clamp(0.0, VIBE_MAX))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn display(self) -> f64 {
        round_half(self.0)
    }
}

/// Venue vibe on the 0-5 scale, or `None` when nothing is known.
///
/// The explicit venue value wins; otherwise the mean of comment ratings.
pub fn aggregate_vibe(venue: &Venue) -> Option<f64> {
    if let Some(v) = venue.vibe {
        return Some(v.value());
    }

    let rated: Vec<f64> = venue
        .live_comments
        .iter()
        .filter_map(|c| c.vibe.map(Vibe::value))
        .collect();

    if rated.is_empty() {
        return None;
    }
    Some(rated.iter().sum::<f64>() / rated.len() as f64)
}
