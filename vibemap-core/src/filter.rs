//! Venue filter pipeline, name search and trending.

use crate::venue::{ActivityLevel, Venue, VenueCategory};
use crate::vibe::aggregate_vibe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(VenueCategory),
}

impl CategoryFilter {
    pub fn admits(&self, category: VenueCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VenueFilter {
    pub category: CategoryFilter,
    /// Inclusive capacity bounds.
    pub capacity: (u8, u8),
    pub exclude_levels: Vec<ActivityLevel>,
    /// Minimum aggregated vibe for bars and clubs.
    pub min_vibe: Option<f64>,
}

impl Default for VenueFilter {
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            capacity: (0, 100),
            exclude_levels: Vec::new(),
            min_vibe: None,
        }
    }
}

impl VenueFilter {
    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn with_capacity(mut self, min: u8, max: u8) -> Self {
        self.capacity = (min, max);
        self
    }

    pub fn excluding(mut self, level: ActivityLevel) -> Self {
        if !self.exclude_levels.contains(&level) {
            self.exclude_levels.push(level);
        }
        self
    }

    pub fn with_min_vibe(mut self, min_vibe: f64) -> Self {
        self.min_vibe = Some(min_vibe);
        self
    }

    pub fn matches(&self, venue: &Venue) -> bool {
        if !self.category.admits(venue.category) {
            return false;
        }
        if venue.featured {
            return true;
        }

        let (lo, hi) = self.capacity;
        if venue.capacity < lo || venue.capacity > hi {
            return false;
        }
        if self.exclude_levels.contains(&venue.activity_level()) {
            return false;
        }

        match self.min_vibe {
            Some(min) if venue.is_entertainment() => {
                // No data means no pass.
                aggregate_vibe(venue).is_some_and(|v| v >= min)
            }
            _ => true,
        }
    }
}

/// Venues passing `filter`, in input order.
pub fn filter_venues<'a>(venues: &'a [Venue], filter: &VenueFilter) -> Vec<&'a Venue> {
    venues.iter().filter(|v| filter.matches(v)).collect()
}

/// Case-insensitive name substring search. A blank query finds nothing.
pub fn search_by_name<'a>(venues: &'a [Venue], query: &str) -> Vec<&'a Venue> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }
    venues
        .iter()
        .filter(|v| v.name.to_lowercase().contains(&q))
        .collect()
}

/// The `n` busiest venues by capacity; ties keep catalog order.
pub fn trending(venues: &[Venue], n: usize) -> Vec<&Venue> {
    let mut ranked: Vec<&Venue> = venues.iter().collect();
    ranked.sort_by(|a, b| b.capacity.cmp(&a.capacity));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::LiveComment;
    use crate::geo::Coordinate;
    use crate::vibe::Vibe;
    use chrono::{TimeZone, Utc};

    fn venue(id: &str, category: VenueCategory, capacity: u8) -> Venue {
        Venue::new(id, format!("Venue {id}"), category, Coordinate::new(37.77, -122.42)).with_capacity(capacity)
    }

    fn catalog() -> Vec<Venue> {
        vec![
            venue("1", VenueCategory::Bar, 80).with_vibe(Vibe::from_raw(8.0)),
            venue("2", VenueCategory::Restaurant, 45),
            venue("3", VenueCategory::Coffee, 10),
            venue("4", VenueCategory::Club, 60),
            venue("5", VenueCategory::Salon, 30),
        ]
    }

    #[test]
    fn all_category_is_identity() {
        let venues = catalog();
        let out = filter_venues(&venues, &VenueFilter::default());
        let ids: Vec<&str> = out.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn category_and_capacity_bounds_are_inclusive() {
        let venues = catalog();
        let f = VenueFilter::default().with_capacity(30, 60);
        let ids: Vec<&str> = filter_venues(&venues, &f).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "5"]);

        let f = f.with_category(CategoryFilter::Only(VenueCategory::Club));
        let ids: Vec<&str> = filter_venues(&venues, &f).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["4"]);
    }

    #[test]
    fn legacy_bar_vibe_eight_sits_between_three_and_four() {
        let venues = vec![venue("1", VenueCategory::Bar, 50).with_vibe(Vibe::from_raw(8.0))];
        assert!(filter_venues(&venues, &VenueFilter::default().with_min_vibe(4.0)).is_empty());
        assert_eq!(filter_venues(&venues, &VenueFilter::default().with_min_vibe(3.0)).len(), 1);
    }

    #[test]
    fn vibe_threshold_fails_closed_for_entertainment_only() {
        let venues = catalog();
        let f = VenueFilter::default().with_min_vibe(1.0);
        let ids: Vec<&str> = filter_venues(&venues, &f).iter().map(|v| v.id.as_str()).collect();
        // Club "4" has no vibe data; the non-entertainment venues are untouched.
        assert_eq!(ids, vec!["1", "2", "3", "5"]);
    }

    #[test]
    fn comment_vibes_feed_the_threshold() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 20, 22, 0, 0).unwrap();
        let club = venue("4", VenueCategory::Club, 60).with_comments(vec![
            LiveComment::new("a", "x", "fun", ts).with_vibe(Vibe::normalized(4.0)),
            LiveComment::new("b", "y", "meh", ts).with_vibe(Vibe::normalized(3.0)),
        ]);
        let venues = vec![club];
        assert_eq!(filter_venues(&venues, &VenueFilter::default().with_min_vibe(3.5)).len(), 1);
        assert!(filter_venues(&venues, &VenueFilter::default().with_min_vibe(3.6)).is_empty());
    }

    #[test]
    fn featured_venue_bypasses_exclusions_but_not_category() {
        let venues = vec![venue("32", VenueCategory::Bar, 90).featured()];
        let f = VenueFilter::default()
            .excluding(ActivityLevel::VeryBusy)
            .with_capacity(0, 10)
            .with_min_vibe(4.5);
        assert_eq!(filter_venues(&venues, &f).len(), 1);

        let f = f.with_category(CategoryFilter::Only(VenueCategory::Coffee));
        assert!(filter_venues(&venues, &f).is_empty());
    }

    #[test]
    fn excluded_levels_drop_matching_venues() {
        let venues = catalog();
        let f = VenueFilter::default().excluding(ActivityLevel::VeryBusy).excluding(ActivityLevel::Available);
        let ids: Vec<&str> = filter_venues(&venues, &f).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "5"]);
    }

    #[test]
    fn name_search_and_trending() {
        let venues = catalog();
        assert_eq!(search_by_name(&venues, "venue 3").len(), 1);
        assert!(search_by_name(&venues, "   ").is_empty());

        let top: Vec<&str> = trending(&venues, 2).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(top, vec!["1", "4"]);
    }

    #[test]
    fn category_filter_parses_all_and_aliases() {
        assert_eq!("All".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "cafe".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(VenueCategory::Coffee)
        );
        assert!("bowling".parse::<CategoryFilter>().is_err());
    }
}
