//! Synthetic live comments for an open venue view.
//!
//! Pure schedule math and comment synthesis; the caller owns the timer and
//! the randomness source.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Duration;

use crate::comment::LiveComment;
use crate::venue::{Span, Venue};
use crate::vibe::Vibe;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedSchedule {
    /// Delay before the guaranteed first comment.
    pub first_delay: Duration,
    pub min_interval: Duration,
    pub max_interval: Duration,
    /// Chance each later tick posts a comment.
    pub probability: f64,
}

impl Default for FeedSchedule {
    fn default() -> Self {
        Self {
            first_delay: Duration::from_secs(2),
            min_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(10),
            probability: 0.3,
        }
    }
}

impl FeedSchedule {
    pub fn next_interval<R: Rng>(&self, rng: &mut R) -> Duration {
        let lo = self.min_interval.as_millis() as u64;
        let hi = self.max_interval.as_millis() as u64;
        if hi <= lo {
            return self.min_interval;
        }
        Duration::from_millis(rng.gen_range(lo..=hi))
    }

    /// Non-finite probabilities never post.
    pub fn should_post<R: Rng>(&self, rng: &mut R) -> bool {
        if !self.probability.is_finite() {
            return false;
        }
        rng.gen_bool(self.probability.clamp(0.0, 1.0))
    }
}

const AUTHORS: &[&str] = &["maya_sf", "dtown_dan", "nightowl", "latte_lena", "sunset_sam", "k.chen"];

const BODIES: &[&str] = &[
    "Just got here, pretty good energy tonight",
    "Line is moving fast",
    "Music is great right now",
    "Found a seat at the bar, not bad",
    "Getting packed, come early",
    "Chill crowd, easy to talk",
    "Staff are super friendly tonight",
    "Wait is longer than expected",
];

/// Builds plausible comments from a fixed template set.
#[derive(Debug, Clone, Default)]
pub struct CommentSynthesizer {
    seq: u64,
}

impl CommentSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn synthesize<R: Rng>(&mut self, venue: &Venue, rng: &mut R, now: DateTime<Utc>) -> LiveComment {
        self.seq += 1;
        let author = AUTHORS.choose(rng).copied().unwrap_or("guest");
        let body = BODIES.choose(rng).copied().unwrap_or("Here now");

        let mut comment = LiveComment::new(
            format!("sim_{}_{}_{}", venue.id, now.timestamp_millis(), self.seq),
            author,
            body,
            now,
        );
        comment.reputation = (rng.gen_range(0..=10) as f64) / 2.0;
        comment.karma = rng.gen_range(0..=1500);

        if venue.is_entertainment() && rng.gen_bool(0.6) {
            comment = comment.with_vibe(Vibe::normalized((rng.gen_range(4..=10) as f64) / 2.0));
        }
        if rng.gen_bool(0.3) {
            let lo = rng.gen_range(0..=20);
            comment = comment.with_wait_range(Span::new(lo, lo + rng.gen_range(5..=15)));
        }
        comment
    }
}
