//! Catalog loading and the one-time schema migration.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};
use vibemap_core::user::normalize_reputation;
use vibemap_core::{
    ActivityLevel, AuthorSnapshot, Coordinate, EventCategory, LiveComment, LiveEvent, Review, Span,
    Venue, VenueCategory, Verification, Vibe,
};

use crate::hours::parse_opening_hours;
use crate::schema::{RawCatalog, RawComment, RawEvent, RawReview, RawVenue, SCHEMA_LATEST, SCHEMA_V1};

const BUILTIN_CATALOG: &str = include_str!("../../data/venues.json");

/// Everything the app starts with, in the current schema.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub venues: Vec<Venue>,
    pub events: Vec<LiveEvent>,
    /// Seed reviews, newest first.
    pub reviews: Vec<Review>,
}

impl Catalog {
    pub fn venue(&self, id: &str) -> Option<&Venue> {
        self.venues.iter().find(|v| v.id == id)
    }

    pub fn seed_reviews_for(&self, venue_id: &str) -> Vec<Review> {
        self.reviews.iter().filter(|r| r.venue_id == venue_id).cloned().collect()
    }
}

/// Bundled San Francisco sample data.
pub fn builtin_catalog(now: DateTime<Utc>) -> Result<Catalog> {
    parse_catalog(BUILTIN_CATALOG, now).context("built-in catalog")
}

pub fn load_catalog(path: &Path, now: DateTime<Utc>) -> Result<Catalog> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_catalog(&text, now).with_context(|| format!("parse {}", path.display()))
}

/// Parse catalog JSON of any known schema version. Relative times
/// (`minutesAgo`, `startsInMinutes`, `daysAgo`) are anchored at `now`.
pub fn parse_catalog(text: &str, now: DateTime<Utc>) -> Result<Catalog> {
    let raw: RawCatalog = serde_json::from_str(text).context("catalog json")?;
    if raw.schema_version == 0 || raw.schema_version > SCHEMA_LATEST {
        bail!("unsupported catalog schema version {}", raw.schema_version);
    }
    let version = raw.schema_version;

    let mut seen = HashSet::new();
    let mut venues = Vec::with_capacity(raw.venues.len());
    for rv in raw.venues {
        if !seen.insert(rv.id.clone()) {
            bail!("duplicate venue id {:?}", rv.id);
        }
        let id = rv.id.clone();
        venues.push(migrate_venue(rv, version, now).with_context(|| format!("venue {id}"))?);
    }

    let events = raw
        .events
        .into_iter()
        .map(|e| migrate_event(e, now))
        .collect::<Result<Vec<_>>>()?;

    let mut reviews = raw
        .reviews
        .into_iter()
        .enumerate()
        .map(|(i, r)| migrate_review(i, r, now))
        .collect::<Result<Vec<_>>>()?;
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    debug!(
        version,
        venues = venues.len(),
        events = events.len(),
        reviews = reviews.len(),
        "catalog loaded"
    );
    Ok(Catalog { venues, events, reviews })
}

fn migrate_vibe(raw: f64, version: u32) -> Vibe {
    if version == SCHEMA_V1 {
        let v = Vibe::from_raw(raw);
        if raw > 5.0 {
            debug!(raw, normalized = v.value(), "legacy vibe rescaled");
        }
        v
    } else {
        if !(0.0..=5.0).contains(&raw) {
            warn!(raw, "vibe outside 0-5; clamping");
        }
        Vibe::normalized(raw)
    }
}

fn span((a, b): (u32, u32)) -> Span {
    Span::new(a, b)
}

fn migrate_venue(rv: RawVenue, version: u32, now: DateTime<Utc>) -> Result<Venue> {
    let category: VenueCategory = rv.category.parse().map_err(|e: String| anyhow!(e))?;

    let capacity = rv.capacity.clamp(0, 100) as u8;
    if capacity as i64 != rv.capacity {
        warn!(id = %rv.id, raw = rv.capacity, "capacity outside 0-100; clamped");
    }

    let mut venue = Venue::new(rv.id, rv.name, category, Coordinate::new(rv.latitude, rv.longitude))
        .with_capacity(capacity)
        .with_address(rv.address);

    if let Some(authored) = rv.activity_level.as_deref() {
        match authored.parse::<ActivityLevel>() {
            Ok(level) if level != venue.activity_level() => {
                debug!(
                    id = %venue.id,
                    authored = %level,
                    derived = %venue.activity_level(),
                    "activity level disagrees with capacity; using capacity"
                );
            }
            Ok(_) => {}
            Err(e) => warn!(id = %venue.id, error = %e, "ignoring authored activity level"),
        }
    }

    venue.wait_time = rv.wait_time;
    venue.wait_interval = rv.wait_time_interval.map(span);
    venue.vibe = rv.vibe.map(|v| migrate_vibe(v, version));
    venue.crowd_range = rv.crowd_range.map(span);
    venue.special_event = rv.is_special_event;
    venue.special_event_description = rv.special_event_description;
    venue.featured = rv.featured;
    venue.description = rv.description;
    venue.summary = rv.ai_summary;
    venue.opening_hours = rv.opening_hours.as_ref().map(parse_opening_hours).transpose()?;
    venue.images = rv.images;

    let mut comments: Vec<LiveComment> = rv
        .live_comments
        .into_iter()
        .map(|c| migrate_comment(c, version, now))
        .collect::<Result<_>>()?;
    comments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    venue.live_comments = comments;

    Ok(venue)
}

/// `now` shifted by a catalog offset; out-of-range offsets are errors.
fn shift(now: DateTime<Utc>, delta: Option<Duration>, what: &str) -> Result<DateTime<Utc>> {
    delta
        .and_then(|d| now.checked_add_signed(d))
        .ok_or_else(|| anyhow!("{what}: time offset out of range"))
}

fn migrate_comment(rc: RawComment, version: u32, now: DateTime<Utc>) -> Result<LiveComment> {
    let at = shift(
        now,
        Duration::try_minutes(rc.minutes_ago.max(0)).map(|d| -d),
        &format!("comment {}", rc.id),
    )?;
    let mut c = LiveComment::new(rc.id, rc.author, rc.text, at);
    c.reputation = rc.reputation.unwrap_or(0.0).clamp(0.0, 5.0);
    c.karma = rc.karma;
    c.vibe = rc.vibe.map(|v| migrate_vibe(v, version));
    c.wait_range = rc.wait_time_range.map(span);
    c.images = rc.images;
    Ok(c)
}

fn event_category(s: Option<&str>) -> EventCategory {
    match s.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("festival") => EventCategory::Festival,
        Some("concert") => EventCategory::Concert,
        Some("market") => EventCategory::Market,
        Some("sports") => EventCategory::Sports,
        _ => EventCategory::Other,
    }
}

fn migrate_event(re: RawEvent, now: DateTime<Utc>) -> Result<LiveEvent> {
    let what = format!("event {}", re.id);
    let start = shift(now, Duration::try_minutes(re.starts_in_minutes), &what)?;
    let end = shift(now, Duration::try_minutes(re.ends_in_minutes.max(re.starts_in_minutes)), &what)?;
    Ok(LiveEvent {
        id: re.id,
        name: re.name,
        description: re.description,
        coordinate: Coordinate::new(re.latitude, re.longitude),
        start,
        end,
        category: event_category(re.category.as_deref()),
        venue_id: re.venue_id,
    })
}

fn migrate_review(index: usize, rr: RawReview, now: DateTime<Utc>) -> Result<Review> {
    if !(1..=5).contains(&rr.rating) {
        bail!("review {index} for venue {}: rating {} outside 1-5", rr.venue_id, rr.rating);
    }
    let created_at = shift(
        now,
        Duration::try_days(rr.days_ago.max(0)).map(|d| -d),
        &format!("review {index} for venue {}", rr.venue_id),
    )?;
    let reputation = rr
        .user_reputation
        .unwrap_or_else(|| normalize_reputation(rr.user_trustability));

    Ok(Review {
        id: rr.id.unwrap_or_else(|| format!("review_seed_{index}")),
        venue_id: rr.venue_id,
        author: AuthorSnapshot {
            user_id: rr.user_id,
            user_name: rr.user_name,
            trustability: rr.user_trustability,
            reputation,
            activity_quotient: rr.activity_quotient,
        },
        rating: rr.rating,
        comment: rr.comment,
        last_visit: created_at.date_naive(),
        time_spent_minutes: rr.total_time_spent,
        verification: rr.verified.then_some(Verification::Location),
        created_at,
    })
}
