use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::debug;
use vibemap_core::{AppEvent, CommentFeed, CommentSynthesizer, EventBus, FeedSchedule, LiveComment, Venue};

/// Mutable state behind one open venue view.
pub struct LiveFeed<R: Rng> {
    venue: Venue,
    feed: CommentFeed,
    schedule: FeedSchedule,
    synth: CommentSynthesizer,
    rng: R,
}

impl<R: Rng> LiveFeed<R> {
    pub fn new(venue: Venue, feed: CommentFeed, schedule: FeedSchedule, rng: R) -> Self {
        Self {
            venue,
            feed,
            schedule,
            synth: CommentSynthesizer::new(),
            rng,
        }
    }

    /// One timer firing. The first tick always posts; later ones pass the
    /// probability gate. Returns the new snapshot when something was added.
    pub fn tick(&mut self, first: bool, now: chrono::DateTime<Utc>) -> Option<Vec<LiveComment>> {
        if !first && !self.schedule.should_post(&mut self.rng) {
            return None;
        }
        let comment = self.synth.synthesize(&self.venue, &mut self.rng, now);
        self.feed.push(comment);
        Some(self.feed.snapshot())
    }

    pub fn next_delay(&mut self) -> std::time::Duration {
        self.schedule.next_interval(&mut self.rng)
    }
}

/// Drive the synthetic feed until the returned handle is aborted.
/// Every update publishes a full `CommentsUpdated` snapshot.
pub fn spawn_feed(venue: Venue, feed: CommentFeed, schedule: FeedSchedule, mut bus: EventBus) -> JoinHandle<()> {
    tokio::spawn(async move {
        let venue_id = venue.id.clone();
        let mut live = LiveFeed::new(venue, feed, schedule, StdRng::from_entropy());

        tokio::time::sleep(schedule.first_delay).await;
        let mut first = true;
        loop {
            if let Some(comments) = live.tick(first, Utc::now()) {
                let delivered = bus.publish(AppEvent::CommentsUpdated {
                    venue_id: venue_id.clone(),
                    comments,
                });
                if delivered == 0 {
                    debug!(venue = %venue_id, "no listeners left; stopping feed");
                    return;
                }
            }
            first = false;
            tokio::time::sleep(live.next_delay()).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;
    use vibemap_core::{Coordinate, VenueCategory};

    fn venue() -> Venue {
        Venue::new("6", "Audio", VenueCategory::Club, Coordinate::new(37.7717, -122.4134))
    }

    #[test]
    fn first_tick_always_posts_and_feed_stays_capped() {
        let now = Utc.with_ymd_and_hms(2026, 2, 20, 23, 0, 0).unwrap();
        let never = FeedSchedule { probability: 0.0, ..FeedSchedule::default() };
        let mut live = LiveFeed::new(venue(), CommentFeed::new(3), never, StdRng::seed_from_u64(3));

        assert_eq!(live.tick(true, now).map(|c| c.len()), Some(1));
        assert!(live.tick(false, now).is_none());

        let always = FeedSchedule { probability: 1.0, ..FeedSchedule::default() };
        let mut live = LiveFeed::new(venue(), CommentFeed::new(3), always, StdRng::seed_from_u64(3));
        for _ in 0..5 {
            live.tick(false, now);
        }
        assert_eq!(live.tick(false, now).map(|c| c.len()), Some(3));
    }

    #[tokio::test]
    async fn aborting_the_view_stops_updates() {
        let fast = FeedSchedule {
            first_delay: Duration::from_millis(5),
            min_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(10),
            probability: 1.0,
        };
        let mut bus = EventBus::new();
        let rx = bus.subscribe();

        let handle = spawn_feed(venue(), CommentFeed::default(), fast, bus);
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        // The bus died with the task, so the channel drains and closes.
        let updates: Vec<AppEvent> = rx.iter().collect();
        assert!(!updates.is_empty());
        assert!(updates
            .iter()
            .all(|e| matches!(e, AppEvent::CommentsUpdated { venue_id, .. } if venue_id == "6")));
    }
}
