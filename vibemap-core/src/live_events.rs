//! City events shown alongside venues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Festival,
    Concert,
    Market,
    Sports,
    Other,
}

impl EventCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            EventCategory::Festival => "🎪",
            EventCategory::Concert => "🎵",
            EventCategory::Market => "🛒",
            EventCategory::Sports => "⚽",
            EventCategory::Other => "📍",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Upcoming,
    Live,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEvent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub coordinate: Coordinate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: EventCategory,
    #[serde(default)]
    pub venue_id: Option<String>,
}

impl LiveEvent {
    /// Live on `[start, end]`, both ends inclusive.
    pub fn status_at(&self, now: DateTime<Utc>) -> EventStatus {
        if now < self.start {
            EventStatus::Upcoming
        } else if now <= self.end {
            EventStatus::Live
        } else {
            EventStatus::Ended
        }
    }
}

/// Events not yet over, soonest first.
pub fn current_events(events: &[LiveEvent], now: DateTime<Utc>) -> Vec<&LiveEvent> {
    let mut out: Vec<&LiveEvent> = events
        .iter()
        .filter(|e| e.status_at(now) != EventStatus::Ended)
        .collect();
    out.sort_by_key(|e| e.start);
    out
}
