//! Venue model: categories, activity buckets, opening hours.
//!
//! Records here are always in the current schema (normalized vibe, typed
//! opening hours). Legacy catalog shapes are migrated by `vibemap-ingest`
//! before they ever reach these types.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::comment::LiveComment;
use crate::geo::Coordinate;
use crate::vibe::Vibe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueCategory {
    Bar,
    Restaurant,
    Salon,
    Coffee,
    Club,
}

impl VenueCategory {
    pub const ALL: [VenueCategory; 5] = [
        VenueCategory::Bar,
        VenueCategory::Restaurant,
        VenueCategory::Salon,
        VenueCategory::Coffee,
        VenueCategory::Club,
    ];

    /// Bars and clubs: the venues where vibe is the headline metric.
    pub fn is_entertainment(&self) -> bool {
        matches!(self, VenueCategory::Bar | VenueCategory::Club)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VenueCategory::Bar => "bar",
            VenueCategory::Restaurant => "restaurant",
            VenueCategory::Salon => "salon",
            VenueCategory::Coffee => "coffee",
            VenueCategory::Club => "club",
        }
    }
}

impl fmt::Display for VenueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VenueCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(VenueCategory::Bar),
            "restaurant" => Ok(VenueCategory::Restaurant),
            "salon" => Ok(VenueCategory::Salon),
            "coffee" | "cafe" => Ok(VenueCategory::Coffee),
            "club" => Ok(VenueCategory::Club),
            other => Err(format!("unknown venue category: {other}")),
        }
    }
}

/// Coarse occupancy bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityLevel {
    VeryBusy,
    ModeratelyBusy,
    SomeActivity,
    Available,
}

impl ActivityLevel {
    /// Quartile buckets over the 0-100 capacity percentage.
    pub fn from_capacity(capacity: u8) -> Self {
        match capacity {
            c if c < 25 => ActivityLevel::Available,
            c if c < 50 => ActivityLevel::SomeActivity,
            c if c < 75 => ActivityLevel::ModeratelyBusy,
            _ => ActivityLevel::VeryBusy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::VeryBusy => "very-busy",
            ActivityLevel::ModeratelyBusy => "moderately-busy",
            ActivityLevel::SomeActivity => "some-activity",
            ActivityLevel::Available => "available",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "very-busy" | "very_busy" => Ok(ActivityLevel::VeryBusy),
            "moderately-busy" | "moderately_busy" | "moderate" => Ok(ActivityLevel::ModeratelyBusy),
            "some-activity" | "some_activity" => Ok(ActivityLevel::SomeActivity),
            "available" => Ok(ActivityLevel::Available),
            other => Err(format!("unknown activity level: {other}")),
        }
    }
}

/// Inclusive low/high pair (minutes for wait times, head count for crowds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub lo: u32,
    pub hi: u32,
}

impl Span {
    pub fn new(a: u32, b: u32) -> Self {
        Self { lo: a.min(b), hi: a.max(b) }
    }

    pub fn midpoint(&self) -> f64 {
        (self.lo as f64 + self.hi as f64) / 2.0
    }
}

/// One day's opening window. `close <= open` means the window runs past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl DayWindow {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.close > self.open {
            t >= self.open && t < self.close
        } else {
            t >= self.open || t < self.close
        }
    }
}

/// Weekly opening-hours table, indexed Monday..Sunday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    days: [Option<DayWindow>; 7],
}

impl OpeningHours {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, day: Weekday, window: DayWindow) -> Self {
        self.set(day, window);
        self
    }

    pub fn set(&mut self, day: Weekday, window: DayWindow) {
        self.days[day.num_days_from_monday() as usize] = Some(window);
    }

    pub fn get(&self, day: Weekday) -> Option<DayWindow> {
        self.days[day.num_days_from_monday() as usize]
    }

    /// Open at this local instant, judged by that weekday's window only.
    pub fn is_open_at(&self, local: NaiveDateTime) -> bool {
        self.get(local.weekday())
            .map(|w| w.contains(local.time()))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub category: VenueCategory,
    #[serde(default)]
    pub address: String,
    pub coordinate: Coordinate,

    /// 0-100 occupancy percentage.
    pub capacity: u8,

    /// Point estimate, minutes.
    #[serde(default)]
    pub wait_time: Option<u32>,
    #[serde(default)]
    pub wait_interval: Option<Span>,

    /// Explicit venue-level vibe; takes precedence over comment ratings.
    #[serde(default)]
    pub vibe: Option<Vibe>,
    #[serde(default)]
    pub crowd_range: Option<Span>,

    #[serde(default)]
    pub special_event: bool,
    #[serde(default)]
    pub special_event_description: Option<String>,

    /// Always shown regardless of vibe/activity exclusions.
    #[serde(default)]
    pub featured: bool,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,

    /// Oldest first.
    #[serde(default)]
    pub live_comments: Vec<LiveComment>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Venue {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: VenueCategory,
        coordinate: Coordinate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            address: String::new(),
            coordinate,
            capacity: 0,
            wait_time: None,
            wait_interval: None,
            vibe: None,
            crowd_range: None,
            special_event: false,
            special_event_description: None,
            featured: false,
            description: None,
            summary: None,
            opening_hours: None,
            live_comments: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Clamped to 100.
    pub fn with_capacity(mut self, capacity: u8) -> Self {
        self.capacity = capacity.min(100);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_vibe(mut self, vibe: Vibe) -> Self {
        self.vibe = Some(vibe);
        self
    }

    pub fn with_crowd_range(mut self, crowd: Span) -> Self {
        self.crowd_range = Some(crowd);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_special_event(mut self, description: impl Into<String>) -> Self {
        self.special_event = true;
        self.special_event_description = Some(description.into());
        self
    }

    pub fn with_opening_hours(mut self, hours: OpeningHours) -> Self {
        self.opening_hours = Some(hours);
        self
    }

    pub fn with_comments(mut self, comments: Vec<LiveComment>) -> Self {
        self.live_comments = comments;
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    /// Derived from capacity; never stored.
    pub fn activity_level(&self) -> ActivityLevel {
        ActivityLevel::from_capacity(self.capacity)
    }

    pub fn is_entertainment(&self) -> bool {
        self.category.is_entertainment()
    }
}
