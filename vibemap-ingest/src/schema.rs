//! On-disk catalog records, as authored (camelCase JSON).
//!
//! Version 1 stores vibes on the legacy 1-10 scale and reviewer standing as
//! 0-100 trustability only. Version 2 stores vibes already on 0-5.

use serde::Deserialize;
use std::collections::BTreeMap;

pub const SCHEMA_V1: u32 = 1;
pub const SCHEMA_V2: u32 = 2;
pub const SCHEMA_LATEST: u32 = SCHEMA_V2;

fn default_version() -> u32 {
    SCHEMA_V1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCatalog {
    #[serde(default = "default_version")]
    pub schema_version: u32,
    pub venues: Vec<RawVenue>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub reviews: Vec<RawReview>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVenue {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// May be out of range in hand-edited files.
    pub capacity: i64,
    #[serde(default)]
    pub wait_time: Option<u32>,
    #[serde(default)]
    pub wait_time_interval: Option<(u32, u32)>,
    /// Authored level; the derived one wins on disagreement.
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default)]
    pub vibe: Option<f64>,
    #[serde(default)]
    pub crowd_range: Option<(u32, u32)>,
    #[serde(default)]
    pub is_special_event: bool,
    #[serde(default)]
    pub special_event_description: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    /// Weekday name -> "11:00 AM - 10:00 PM".
    #[serde(default)]
    pub opening_hours: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub live_comments: Vec<RawComment>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    pub id: String,
    pub author: String,
    pub text: String,
    /// Age relative to load time.
    #[serde(default)]
    pub minutes_ago: i64,
    #[serde(default)]
    pub vibe: Option<f64>,
    #[serde(default)]
    pub reputation: Option<f64>,
    #[serde(default)]
    pub karma: u64,
    #[serde(default)]
    pub wait_time_range: Option<(u32, u32)>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Offsets relative to load time.
    pub starts_in_minutes: i64,
    pub ends_in_minutes: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub venue_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    #[serde(default)]
    pub id: Option<String>,
    pub venue_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_trustability: u32,
    #[serde(default)]
    pub user_reputation: Option<f64>,
    #[serde(default)]
    pub activity_quotient: u32,
    pub rating: u8,
    pub comment: String,
    pub days_ago: i64,
    pub total_time_spent: u32,
    #[serde(default)]
    pub verified: bool,
}
