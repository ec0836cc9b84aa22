//! Users, reviews and the trust/karma bookkeeping around them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Maximum legacy trustability.
pub const TRUSTABILITY_MAX: u32 = 100;

/// Maximum user-facing reputation.
pub const REPUTATION_MAX: f64 = 5.0;

/// Convert 0-100 trustability into 0-5 reputation.
pub fn normalize_reputation(trustability: u32) -> f64 {
    ((trustability as f64 / TRUSTABILITY_MAX as f64) * REPUTATION_MAX).clamp(0.0, REPUTATION_MAX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,

    /// 0-100, legacy.
    #[serde(default)]
    pub trustability: u32,
    /// 0-5, shown to users as "trust". Absent in legacy records.
    #[serde(default)]
    pub reputation: f64,
    /// Experience points. Only ever grows.
    #[serde(default)]
    pub karma: u64,

    #[serde(default)]
    pub total_reviews: u32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A zeroed user.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            trustability: 0,
            reputation: 0.0,
            karma: 0,
            total_reviews: 0,
            created_at,
        }
    }

    /// Identity synthesized when nothing usable is cached.
    pub fn demo(now: DateTime<Utc>) -> Self {
        Self::new("user_demo", "demo@vibemap.local", "demo", now)
    }

    /// Raise trustability (capped) and keep reputation in step.
    pub fn add_trust(&mut self, points: u32) {
        self.trustability = (self.trustability + points).min(TRUSTABILITY_MAX);
        self.reputation = normalize_reputation(self.trustability);
    }

    /// Fill in reputation for records written before it existed.
    pub fn migrate_legacy(&mut self) {
        if self.reputation == 0.0 && self.trustability > 0 {
            self.reputation = normalize_reputation(self.trustability);
        }
    }

    pub fn add_karma(&mut self, points: u64) {
        self.karma = self.karma.saturating_add(points);
    }

    /// Compact experience label: 950 -> "950", 1200 -> "1.2k".
    pub fn karma_label(&self) -> String {
        if self.karma >= 1000 {
            format!("{:.1}k", self.karma as f64 / 1000.0)
        } else {
            self.karma.to_string()
        }
    }
}

/// How a review earned its verified badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    /// Author's position matched the venue.
    Location,
    /// Author used their one-time "allow once" grace.
    Override,
}

/// Author standing captured at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSnapshot {
    pub user_id: String,
    pub user_name: String,
    pub trustability: u32,
    pub reputation: f64,
    /// Per-venue activity quotient, 0-100.
    #[serde(default)]
    pub activity_quotient: u32,
}

impl AuthorSnapshot {
    pub fn of(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            trustability: user.trustability,
            reputation: user.reputation,
            activity_quotient: 0,
        }
    }
}

/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub venue_id: String,
    pub author: AuthorSnapshot,
    /// 1-5 stars.
    pub rating: u8,
    pub comment: String,
    pub last_visit: NaiveDate,
    pub time_spent_minutes: u32,
    /// `None` for reviews that were never location-checked.
    #[serde(default)]
    pub verification: Option<Verification>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Both location matches and overrides count as verified.
    pub fn is_verified(&self) -> bool {
        self.verification.is_some()
    }
}
