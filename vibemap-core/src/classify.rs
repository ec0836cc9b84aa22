//! Display lookup tables: labels, icons, colors, and wait/age formatting.

use chrono::{DateTime, Utc};

use crate::venue::{ActivityLevel, Span, VenueCategory};

pub fn category_label(category: VenueCategory) -> &'static str {
    match category {
        VenueCategory::Bar => "Bar",
        VenueCategory::Club => "Club",
        VenueCategory::Restaurant => "Restaurant",
        VenueCategory::Salon => "Salon",
        VenueCategory::Coffee => "Coffee Shop",
    }
}

pub fn category_icon(category: VenueCategory) -> &'static str {
    match category {
        VenueCategory::Bar | VenueCategory::Club => "🍺",
        VenueCategory::Restaurant => "🍽️",
        VenueCategory::Salon => "✂️",
        VenueCategory::Coffee => "☕",
    }
}

pub fn activity_color(level: ActivityLevel) -> &'static str {
    match level {
        ActivityLevel::VeryBusy => "#EF4444",
        ActivityLevel::ModeratelyBusy => "#F97316",
        ActivityLevel::SomeActivity => "#EAB308",
        ActivityLevel::Available => "#22C55E",
    }
}

pub fn activity_label(level: ActivityLevel) -> &'static str {
    match level {
        ActivityLevel::VeryBusy => "Very busy",
        ActivityLevel::ModeratelyBusy => "Moderately busy",
        ActivityLevel::SomeActivity => "Some activity",
        ActivityLevel::Available => "Available",
    }
}

/// Username-box color for a 0-5 reputation.
pub fn reputation_color(reputation: f64) -> &'static str {
    match reputation {
        r if r >= 4.0 => "#22C55E",
        r if r >= 3.0 => "#84CC16",
        r if r >= 2.0 => "#EAB308",
        r if r >= 1.0 => "#F97316",
        _ => "#EF4444",
    }
}

pub fn reputation_bg_color(reputation: f64) -> &'static str {
    match reputation {
        r if r >= 4.0 => "#D1FAE5",
        r if r >= 3.0 => "#ECFCCB",
        r if r >= 2.0 => "#FEF9C3",
        r if r >= 1.0 => "#FFEDD5",
        _ => "#FEE2E2",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Dot,
    /// Hot entertainment venue.
    Fire,
    /// Featured venue.
    Star,
}

/// Map marker color for a 0-5 vibe; no data renders like a low vibe.
pub fn vibe_marker_color(vibe: Option<f64>) -> &'static str {
    match vibe {
        Some(v) if v >= 4.0 => "#FF8C00",
        Some(v) if v >= 2.5 => "#D4A574",
        _ => "#C4A484",
    }
}

pub fn marker_kind(category: VenueCategory, vibe: Option<f64>, featured: bool) -> MarkerKind {
    if featured {
        MarkerKind::Star
    } else if category.is_entertainment() && vibe.is_some_and(|v| v >= 4.0) {
        MarkerKind::Fire
    } else {
        MarkerKind::Dot
    }
}

/// 0 -> "No wait", 45 -> "45 min", 90 -> "1h 30m", 120 -> "2h".
pub fn format_wait_time(minutes: u32) -> String {
    if minutes == 0 {
        return "No wait".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} min");
    }
    let (h, m) = (minutes / 60, minutes % 60);
    if m > 0 { format!("{h}h {m}m") } else { format!("{h}h") }
}

/// "10-20 min"; falls back to hour notation once the upper end reaches an hour.
pub fn format_wait_interval(span: Span) -> String {
    if span.hi == 0 {
        return "No wait".to_string();
    }
    if span.lo == span.hi {
        return format_wait_time(span.hi);
    }
    if span.hi < 60 {
        return format!("{}-{} min", span.lo, span.hi);
    }
    format!("{} - {}", format_wait_time(span.lo), format_wait_time(span.hi))
}

/// Relative age: "just now", "5m ago", "3h ago", "2d ago".
pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}
