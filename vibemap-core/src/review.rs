//! Review submission and the persisted review collection.
//!
//! Submission outcomes:
//! 1) position lookup failed -> error, nothing saved
//! 2) within tolerance -> saved, verified by location
//! 3) outside, grace unused, not confirmed -> `OverrideAvailable`
//! 4) outside, grace unused, confirmed -> saved, verified by override, grace spent
//! 5) outside, grace spent -> `NotAtVenue`

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{Result, VibeError};
use crate::geo::{within_tolerance, Coordinate, GeoError, REVIEW_TOLERANCE_M};
use crate::session::Session;
use crate::store::{allow_once_key, load_json, save_json, KeyValueStore, Loaded, REVIEWS_KEY};
use crate::user::{AuthorSnapshot, Review, Verification};
use crate::venue::Venue;

/// Karma for a location-verified review.
pub const VERIFIED_REVIEW_KARMA: u64 = 10;
/// Karma for a review submitted on the one-time override.
pub const OVERRIDE_REVIEW_KARMA: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub rating: u8,
    pub comment: String,
    pub time_spent_minutes: u32,
}

impl ReviewDraft {
    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(VibeError::Validation("rating must be 1..=5".to_string()));
        }
        if self.comment.trim().is_empty() {
            return Err(VibeError::Validation("comment must be non-empty".to_string()));
        }
        if self.time_spent_minutes == 0 {
            return Err(VibeError::Validation("time spent must be at least 1 minute".to_string()));
        }
        Ok(())
    }
}

/// Trust gained from a review: the star rating when verified by location,
/// one less (minimum 1) on override.
pub fn trust_increase(rating: u8, verification: Verification) -> u32 {
    match verification {
        Verification::Location => rating as u32,
        Verification::Override => (rating as u32).saturating_sub(1).max(1),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReviewPolicy {
    pub tolerance_m: f64,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self { tolerance_m: REVIEW_TOLERANCE_M }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewDesk {
    policy: ReviewPolicy,
}

impl ReviewDesk {
    pub fn new(policy: ReviewPolicy) -> Self {
        Self { policy }
    }

    /// Verify, persist, and credit the author. See module docs for outcomes.
    pub fn submit<S: KeyValueStore>(
        &self,
        session: &mut Session<S>,
        venue: &Venue,
        draft: ReviewDraft,
        position: std::result::Result<Coordinate, GeoError>,
        confirm_override: bool,
        now: DateTime<Utc>,
    ) -> Result<Review> {
        draft.validate()?;

        let user = session
            .user()
            .cloned()
            .ok_or_else(|| VibeError::Auth("sign in to leave a review".to_string()))?;

        let position = position.inspect_err(|e| warn!(error = %e, "location lookup failed"))?;
        let at_venue = within_tolerance(position, venue.coordinate, self.policy.tolerance_m);

        let grace_key = allow_once_key(&user.id);
        let verification = if at_venue {
            Verification::Location
        } else {
            let grace_used = session.store().load(&grace_key)?.as_deref() == Some("true");
            match (grace_used, confirm_override) {
                (true, _) => return Err(VibeError::NotAtVenue),
                (false, false) => return Err(VibeError::OverrideAvailable),
                (false, true) => Verification::Override,
            }
        };

        let review = Review {
            id: format!("review_{}", now.timestamp_millis()),
            venue_id: venue.id.clone(),
            author: AuthorSnapshot::of(&user),
            rating: draft.rating,
            comment: draft.comment.trim().to_string(),
            last_visit: now.date_naive(),
            time_spent_minutes: draft.time_spent_minutes,
            verification: Some(verification),
            created_at: now,
        };
        append_review(session.store_mut(), &review)?;
        // Only spent once the review itself is stored.
        if verification == Verification::Override {
            session.store_mut().save(&grace_key, "true".to_string())?;
            debug!(user = %user.id, "allow-once override spent");
        }

        let trust = trust_increase(draft.rating, verification);
        let karma = match verification {
            Verification::Location => VERIFIED_REVIEW_KARMA,
            Verification::Override => OVERRIDE_REVIEW_KARMA,
        };
        session.update_user(|u| {
            u.add_trust(trust);
            u.add_karma(karma);
            u.total_reviews += 1;
        })?;

        info!(venue = %venue.id, ?verification, trust, "review saved");
        Ok(review)
    }
}

/// Every stored review; unreadable data counts as none.
pub fn load_reviews<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<Review>> {
    Ok(match load_json::<Vec<Review>, S>(store, REVIEWS_KEY)? {
        Loaded::Present(v) => v,
        Loaded::Absent => Vec::new(),
        Loaded::Malformed(e) => {
            warn!(error = %e, "stored reviews are unreadable; ignoring");
            Vec::new()
        }
    })
}

/// Reviews for one venue, newest first.
pub fn reviews_for_venue<S: KeyValueStore + ?Sized>(store: &S, venue_id: &str) -> Result<Vec<Review>> {
    let mut out: Vec<Review> = load_reviews(store)?
        .into_iter()
        .filter(|r| r.venue_id == venue_id)
        .collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(out)
}

pub fn append_review<S: KeyValueStore + ?Sized>(store: &mut S, review: &Review) -> Result<()> {
    let mut all = load_reviews(store)?;
    all.push(review.clone());
    save_json(store, REVIEWS_KEY, &all)
}

/// Mean star rating, 0 when there are no reviews.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    reviews.iter().map(|r| r.rating as f64).sum::<f64>() / reviews.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EARTH_RADIUS_M;
    use crate::store::MemoryStore;
    use crate::venue::VenueCategory;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 20, 21, 0, 0).unwrap()
    }

    fn alembic() -> Venue {
        Venue::new("25", "The Alembic", VenueCategory::Bar, Coordinate::new(37.7698, -122.4484))
    }

    fn north_of(c: Coordinate, meters: f64) -> Coordinate {
        Coordinate::new(c.lat + (meters / EARTH_RADIUS_M).to_degrees(), c.lng)
    }

    fn draft(rating: u8) -> ReviewDraft {
        ReviewDraft {
            rating,
            comment: "Great cocktails".to_string(),
            time_spent_minutes: 45,
        }
    }

    fn session() -> Session<MemoryStore> {
        Session::open(MemoryStore::new(), now()).unwrap()
    }

    #[test]
    fn on_site_review_is_location_verified_and_credits_author() {
        let mut s = session();
        let v = alembic();
        let desk = ReviewDesk::default();

        let r = desk
            .submit(&mut s, &v, draft(4), Ok(north_of(v.coordinate, 20.0)), false, now())
            .unwrap();

        assert_eq!(r.verification, Some(Verification::Location));
        assert!(r.is_verified());
        let u = s.user().unwrap();
        assert_eq!(u.trustability, 4);
        assert_eq!(u.karma, VERIFIED_REVIEW_KARMA);
        assert_eq!(u.total_reviews, 1);
        assert_eq!(reviews_for_venue(s.store(), "25").unwrap().len(), 1);
    }

    #[test]
    fn off_site_review_offers_override_once() {
        let mut s = session();
        let v = alembic();
        let desk = ReviewDesk::default();
        let far = north_of(v.coordinate, 500.0);

        let err = desk.submit(&mut s, &v, draft(5), Ok(far), false, now()).unwrap_err();
        assert!(matches!(err, VibeError::OverrideAvailable));
        assert!(reviews_for_venue(s.store(), "25").unwrap().is_empty());

        let r = desk.submit(&mut s, &v, draft(5), Ok(far), true, now()).unwrap();
        assert_eq!(r.verification, Some(Verification::Override));
        assert_eq!(s.user().unwrap().trustability, 4);
        assert_eq!(s.user().unwrap().karma, OVERRIDE_REVIEW_KARMA);

        // Grace is spent; confirming again does not help.
        let err = desk
            .submit(&mut s, &v, draft(5), Ok(far), true, now() + Duration::minutes(1))
            .unwrap_err();
        assert!(matches!(err, VibeError::NotAtVenue));
    }

    /// Memory store whose writes to one key fail.
    struct FailingStore {
        inner: MemoryStore,
        broken_key: &'static str,
    }

    impl KeyValueStore for FailingStore {
        fn load(&self, key: &str) -> Result<Option<String>> {
            self.inner.load(key)
        }

        fn save(&mut self, key: &str, value: String) -> Result<()> {
            if key == self.broken_key {
                return Err(VibeError::Store(format!("disk full writing {key}")));
            }
            self.inner.save(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_review_write_keeps_override_unspent() {
        let store = FailingStore { inner: MemoryStore::new(), broken_key: REVIEWS_KEY };
        let mut s = Session::open(store, now()).unwrap();
        let v = alembic();
        let far = north_of(v.coordinate, 500.0);

        let err = ReviewDesk::default().submit(&mut s, &v, draft(5), Ok(far), true, now()).unwrap_err();
        assert!(matches!(err, VibeError::Store(_)));

        let user_id = s.user().unwrap().id.clone();
        assert!(s.store().load(&allow_once_key(&user_id)).unwrap().is_none());
        assert_eq!(s.user().unwrap().karma, 0);
        assert_eq!(s.user().unwrap().total_reviews, 0);
    }

    #[test]
    fn location_error_blocks_submission() {
        let mut s = session();
        let err = ReviewDesk::default()
            .submit(&mut s, &alembic(), draft(3), Err(GeoError::PermissionDenied), true, now())
            .unwrap_err();
        assert!(matches!(err, VibeError::Geolocation(GeoError::PermissionDenied)));
        assert_eq!(s.user().unwrap().total_reviews, 0);
    }

    #[test]
    fn invalid_draft_is_rejected_before_location_check() {
        let mut s = session();
        let err = ReviewDesk::default()
            .submit(&mut s, &alembic(), draft(6), Err(GeoError::Unavailable), false, now())
            .unwrap_err();
        assert!(matches!(err, VibeError::Validation(_)));
    }

    #[test]
    fn override_trust_is_rating_minus_one_floor_one() {
        assert_eq!(trust_increase(5, Verification::Override), 4);
        assert_eq!(trust_increase(1, Verification::Override), 1);
        assert_eq!(trust_increase(1, Verification::Location), 1);
    }

    #[test]
    fn venue_reviews_are_newest_first_and_corruption_reads_empty() {
        let mut s = session();
        let v = alembic();
        let desk = ReviewDesk::default();
        let here = v.coordinate;

        desk.submit(&mut s, &v, draft(3), Ok(here), false, now()).unwrap();
        desk.submit(&mut s, &v, draft(5), Ok(here), false, now() + Duration::hours(1)).unwrap();

        let reviews = reviews_for_venue(s.store(), "25").unwrap();
        assert_eq!(reviews[0].rating, 5);
        assert_eq!(average_rating(&reviews), 4.0);

        s.store_mut().save(REVIEWS_KEY, "[{".to_string()).unwrap();
        assert!(reviews_for_venue(s.store(), "25").unwrap().is_empty());
    }
}
