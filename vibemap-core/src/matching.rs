//! "Feeling lucky": free-text vibe matching.
//!
//! Deterministic keyword scoring, no model in the loop:
//! 1) tokenize the query and note which keyword groups it mentions
//! 2) every mentioned group adds fixed points to venues meeting its condition
//! 3) keep scores at or above the threshold, best first, top N
//! 4) nothing qualifies -> popular venues stand in

use chrono::NaiveDateTime;
use tracing::debug;

use crate::venue::{ActivityLevel, Venue, VenueCategory};
use crate::vibe::aggregate_vibe;

/// Score given to every venue picked by the popularity fallback.
pub const FALLBACK_SCORE: u32 = 1;

/// Vibe (0-5) considered "good"; legacy 7 on the 1-10 scale.
pub const GOOD_VIBE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeywordGroup {
    Quiet,
    Busy,
    Food,
    Drink,
    Coffee,
    Vibe,
    Crowd,
    Special,
    Cuisine,
    Music,
    Open,
}

impl KeywordGroup {
    pub const ALL: [KeywordGroup; 11] = [
        KeywordGroup::Quiet,
        KeywordGroup::Busy,
        KeywordGroup::Food,
        KeywordGroup::Drink,
        KeywordGroup::Coffee,
        KeywordGroup::Vibe,
        KeywordGroup::Crowd,
        KeywordGroup::Special,
        KeywordGroup::Cuisine,
        KeywordGroup::Music,
        KeywordGroup::Open,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            KeywordGroup::Quiet => &["quiet", "relaxed", "chill"],
            KeywordGroup::Busy => &["busy", "lively", "energetic"],
            KeywordGroup::Food => &["food", "eat", "dinner"],
            KeywordGroup::Drink => &["drink", "cocktail", "bar"],
            KeywordGroup::Coffee => &["coffee", "cafe"],
            KeywordGroup::Vibe => &["vibe", "atmosphere"],
            KeywordGroup::Crowd => &["crowd", "people"],
            KeywordGroup::Special => &["special", "event"],
            KeywordGroup::Cuisine => &["asian", "japanese", "sushi", "ramen"],
            KeywordGroup::Music => &["music", "sound", "tunes"],
            KeywordGroup::Open => &["open now", "open"],
        }
    }
}

fn tokenize(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

fn word_matches(token: &str, word: &str) -> bool {
    token == word || token.strip_suffix('s') == Some(word)
}

/// Keyword (possibly several words) appears as consecutive tokens.
/// Only the last word may be pluralized.
fn contains_keyword(tokens: &[String], keyword: &str) -> bool {
    let words: Vec<&str> = keyword.split_whitespace().collect();
    let Some((last, head)) = words.split_last() else {
        return false;
    };
    if tokens.len() < words.len() {
        return false;
    }
    tokens.windows(words.len()).any(|w| {
        head.iter().zip(w).all(|(word, tok)| tok == word) && word_matches(&w[words.len() - 1], last)
    })
}

/// A parsed query: which groups it mentions, and which cuisine words.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub groups: Vec<KeywordGroup>,
    pub cuisines: Vec<&'static str>,
}

impl Query {
    pub fn parse(input: &str) -> Self {
        let tokens = tokenize(input);
        let groups = KeywordGroup::ALL
            .into_iter()
            .filter(|g| g.keywords().iter().any(|k| contains_keyword(&tokens, k)))
            .collect();
        let cuisines = KeywordGroup::Cuisine
            .keywords()
            .iter()
            .copied()
            .filter(|k| contains_keyword(&tokens, k))
            .collect();
        Self { groups, cuisines }
    }

    pub fn mentions(&self, group: KeywordGroup) -> bool {
        self.groups.contains(&group)
    }
}

/// Points one group awards one venue.
fn group_points(group: KeywordGroup, query: &Query, venue: &Venue, now: NaiveDateTime) -> u32 {
    let entertainment = venue.is_entertainment();
    let category = venue.category;
    let mut pts = 0;

    match group {
        KeywordGroup::Quiet => {
            if venue.activity_level() == ActivityLevel::Available || venue.capacity < 40 {
                pts += 3;
            }
            if category == VenueCategory::Coffee {
                pts += 2;
            }
        }
        KeywordGroup::Busy => {
            if venue.activity_level() == ActivityLevel::VeryBusy || venue.capacity > 70 {
                pts += 3;
            }
            if entertainment {
                pts += 2;
            }
        }
        KeywordGroup::Food if category == VenueCategory::Restaurant => pts += 4,
        KeywordGroup::Drink if entertainment => pts += 4,
        KeywordGroup::Coffee if category == VenueCategory::Coffee => pts += 4,
        KeywordGroup::Vibe if aggregate_vibe(venue).is_some_and(|v| v >= GOOD_VIBE) => pts += 2,
        KeywordGroup::Crowd if venue.crowd_range.is_some_and(|c| c.midpoint() >= 30.0) => pts += 2,
        KeywordGroup::Special if venue.special_event => pts += 5,
        KeywordGroup::Cuisine if category == VenueCategory::Restaurant => {
            pts += 6;
            let name = venue.name.to_lowercase();
            let desc = venue.description.as_deref().unwrap_or("").to_lowercase();
            if query.cuisines.iter().any(|c| name.contains(c) || desc.contains(c)) {
                pts += 10;
            }
        }
        KeywordGroup::Music => {
            if venue
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains("music"))
            {
                pts += 5;
            }
            if entertainment {
                pts += 3;
            }
        }
        KeywordGroup::Open if venue.opening_hours.as_ref().is_some_and(|h| h.is_open_at(now)) => pts += 4,
        _ => {}
    }

    pts
}

/// Total score for one venue. `now` is venue-local wall-clock time.
pub fn score_venue(query: &Query, venue: &Venue, now: NaiveDateTime) -> u32 {
    let mut score: u32 = query
        .groups
        .iter()
        .map(|g| group_points(*g, query, venue, now))
        .sum();

    if venue
        .summary
        .as_deref()
        .is_some_and(|s| s.to_lowercase().contains("recommended"))
    {
        score += 1;
    }

    score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub top_n: usize,
    /// Lowest score that counts as a match.
    pub min_score: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { top_n: 5, min_score: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredVenue<'a> {
    pub venue: &'a Venue,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchOutcome<'a> {
    /// Best first.
    pub picks: Vec<ScoredVenue<'a>>,
    /// True when no venue matched and popular venues were substituted.
    pub fallback: bool,
}

impl<'a> MatchOutcome<'a> {
    pub fn best(&self) -> Option<&'a Venue> {
        self.picks.first().map(|p| p.venue)
    }
}

fn is_popular(venue: &Venue) -> bool {
    venue.capacity > 50 || venue.special_event || aggregate_vibe(venue).is_some_and(|v| v >= GOOD_VIBE)
}

/// Rank `venues` against free-text `input`.
///
/// A blank query matches nothing and does not trigger the fallback.
pub fn recommend<'a>(input: &str, venues: &'a [Venue], now: NaiveDateTime, cfg: &MatchConfig) -> MatchOutcome<'a> {
    if input.trim().is_empty() || venues.is_empty() {
        return MatchOutcome::default();
    }

    let query = Query::parse(input);
    debug!(groups = ?query.groups, "parsed vibe query");

    let mut picks: Vec<ScoredVenue<'a>> = venues
        .iter()
        .map(|v| ScoredVenue { venue: v, score: score_venue(&query, v, now) })
        .filter(|s| s.score > 0 && s.score >= cfg.min_score)
        .collect();

    if !picks.is_empty() {
        // Stable: equal scores keep catalog order.
        picks.sort_by(|a, b| b.score.cmp(&a.score));
        picks.truncate(cfg.top_n);
        return MatchOutcome { picks, fallback: false };
    }

    let mut fallback: Vec<ScoredVenue<'a>> = venues
        .iter()
        .filter(|v| is_popular(v))
        .take(cfg.top_n)
        .map(|v| ScoredVenue { venue: v, score: FALLBACK_SCORE })
        .collect();
    if fallback.is_empty() {
        fallback.extend(venues.first().map(|v| ScoredVenue { venue: v, score: FALLBACK_SCORE }));
    }
    debug!(count = fallback.len(), "no keyword match; using popular venues");

    MatchOutcome { picks: fallback, fallback: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::venue::{DayWindow, OpeningHours, Span};
    use crate::vibe::Vibe;
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        // 2026-02-20 is a Friday.
        NaiveDate::from_ymd_opt(2026, 2, 20).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn venue(id: &str, name: &str, category: VenueCategory, capacity: u8) -> Venue {
        Venue::new(id, name, category, Coordinate::new(37.77, -122.42)).with_capacity(capacity)
    }

    fn ids<'a>(out: &MatchOutcome<'a>) -> Vec<&'a str> {
        out.picks.iter().map(|p| p.venue.id.as_str()).collect()
    }

    #[test]
    fn quiet_coffee_shop_scores_nine() {
        let v = venue("1", "Sightglass", VenueCategory::Coffee, 15);
        assert_eq!(v.activity_level(), ActivityLevel::Available);

        let q = Query::parse("quiet coffee shop");
        assert_eq!(q.groups, vec![KeywordGroup::Quiet, KeywordGroup::Coffee]);
        assert_eq!(score_venue(&q, &v, at(10, 0)), 9);
    }

    #[test]
    fn plurals_match_but_partial_words_do_not() {
        assert!(Query::parse("cocktails please").mentions(KeywordGroup::Drink));
        assert!(!Query::parse("barber").mentions(KeywordGroup::Drink));
        assert!(Query::parse("Open NOW!").mentions(KeywordGroup::Open));
    }

    #[test]
    fn adding_a_group_never_lowers_a_score() {
        let venues = vec![
            venue("1", "A", VenueCategory::Bar, 80).with_vibe(Vibe::from_raw(9.0)),
            venue("2", "B", VenueCategory::Coffee, 20),
            venue("3", "C", VenueCategory::Restaurant, 55).with_special_event("Trivia"),
        ];
        let base = Query::parse("drinks");
        let more = Query::parse("drinks with a lively vibe and a special event");
        for v in &venues {
            assert!(score_venue(&more, v, at(21, 0)) >= score_venue(&base, v, at(21, 0)));
        }
    }

    fn friday_evenings() -> OpeningHours {
        OpeningHours::new().with_day(
            Weekday::Fri,
            DayWindow::new(NaiveTime::from_hms_opt(17, 0, 0).unwrap(), NaiveTime::from_hms_opt(2, 0, 0).unwrap()),
        )
    }

    #[test]
    fn satisfying_one_more_condition_never_lowers_a_score() {
        let q = Query::parse("special event with live music, a good vibe and a crowd, open now");
        let now = at(21, 0);

        let mut v = venue("1", "Corner", VenueCategory::Restaurant, 30);
        let mut last = score_venue(&q, &v, now);
        assert_eq!(last, 0);

        let steps: [fn(Venue) -> Venue; 5] = [
            |v| v.with_special_event("Trivia"),
            |v| v.with_vibe(Vibe::normalized(4.0)),
            |v| v.with_crowd_range(Span::new(40, 60)),
            |v| v.with_description("Live music every night"),
            |v| v.with_opening_hours(friday_evenings()),
        ];
        for step in steps {
            v = step(v);
            let score = score_venue(&q, &v, now);
            assert!(score > last, "{score} <= {last}");
            last = score;
        }
    }

    #[test]
    fn top_n_is_sorted_and_ties_keep_catalog_order() {
        let venues: Vec<Venue> = (0..8)
            .map(|i| venue(&i.to_string(), "Bar", VenueCategory::Bar, 10))
            .chain(std::iter::once(venue("busy", "Bar", VenueCategory::Bar, 90)))
            .collect();

        let out = recommend("busy bar", &venues, at(21, 0), &MatchConfig::default());
        assert!(!out.fallback);
        assert_eq!(ids(&out), vec!["busy", "0", "1", "2", "3"]);
        assert_eq!(out.picks[0].score, 9);
        assert_eq!(out.picks[1].score, 6);

        let again = recommend("busy bar", &venues, at(21, 0), &MatchConfig::default());
        assert_eq!(ids(&again), ids(&out));
    }

    #[test]
    fn cuisine_words_boost_named_restaurants() {
        let venues = vec![
            venue("1", "Mission Tacos", VenueCategory::Restaurant, 40),
            venue("2", "Hinodeya Ramen", VenueCategory::Restaurant, 40),
        ];
        let out = recommend("ramen tonight", &venues, at(19, 0), &MatchConfig::default());
        assert_eq!(out.best().unwrap().id, "2");
        assert_eq!(out.picks[0].score, 16);
        assert_eq!(out.picks[1].score, 6);
    }

    #[test]
    fn open_group_checks_todays_window() {
        let hours = OpeningHours::new().with_day(
            Weekday::Fri,
            DayWindow::new(
                NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            ),
        );
        let venues = vec![venue("1", "Hokkaido", VenueCategory::Restaurant, 40).with_opening_hours(hours)];
        let q = Query::parse("what's open now");
        assert_eq!(score_venue(&q, &venues[0], at(12, 0)), 4);
        assert_eq!(score_venue(&q, &venues[0], at(23, 0)), 0);
    }

    #[test]
    fn music_and_crowd_and_summary_contribute() {
        let v = venue("1", "Jazz Den", VenueCategory::Bar, 45)
            .with_description("Live music every night")
            .with_crowd_range(Span::new(20, 60))
            .with_summary("Jazz Den is lively - highly recommended");
        let q = Query::parse("music and people");
        // music: 5 + 3, crowd: 2, summary: 1
        assert_eq!(score_venue(&q, &v, at(21, 0)), 11);
    }

    #[test]
    fn no_match_falls_back_to_popular_venues() {
        let venues = vec![
            venue("1", "Quiet Salon", VenueCategory::Salon, 10),
            venue("2", "Packed Salon", VenueCategory::Salon, 70),
            venue("3", "Event Salon", VenueCategory::Salon, 10).with_special_event("Open house"),
        ];
        let out = recommend("xyzzy", &venues, at(12, 0), &MatchConfig::default());
        assert!(out.fallback);
        assert_eq!(ids(&out), vec!["2", "3"]);
        assert!(out.picks.iter().all(|p| p.score == FALLBACK_SCORE));
    }

    #[test]
    fn empty_popular_pool_falls_back_to_first_venue() {
        let venues = vec![
            venue("1", "A", VenueCategory::Salon, 10),
            venue("2", "B", VenueCategory::Salon, 20),
        ];
        let out = recommend("xyzzy", &venues, at(12, 0), &MatchConfig::default());
        assert!(out.fallback);
        assert_eq!(ids(&out), vec!["1"]);
    }

    #[test]
    fn min_score_threshold_pushes_weak_matches_to_fallback() {
        let venues = vec![venue("1", "A", VenueCategory::Coffee, 60)];
        let cfg = MatchConfig { top_n: 5, min_score: 5 };
        let out = recommend("coffee", &venues, at(9, 0), &cfg);
        assert!(out.fallback);

        let out = recommend("coffee", &venues, at(9, 0), &MatchConfig::default());
        assert!(!out.fallback);
        assert_eq!(out.picks[0].score, 4);
    }

    #[test]
    fn blank_query_matches_nothing() {
        let venues = vec![venue("1", "A", VenueCategory::Bar, 90)];
        let out = recommend("   ", &venues, at(12, 0), &MatchConfig::default());
        assert!(out.picks.is_empty());
        assert!(!out.fallback);
    }
}
