//! vibemap-core: venue model, filtering, vibe matching and review rules for VibeMap

pub mod bus;
pub mod classify;
pub mod comment;
pub mod error;
pub mod filter;
pub mod geo;
pub mod live_events;
pub mod matching;
pub mod review;
pub mod session;
pub mod simulate;
pub mod store;
pub mod summary;
pub mod user;
pub mod venue;
pub mod vibe;

pub use bus::{AppEvent, EventBus};
pub use comment::{post_comment, record_comment, submit_comment, venue_feed, CommentDraft, CommentFeed, LiveComment, FEED_CAP};
pub use error::{Result, VibeError};
pub use filter::{filter_venues, search_by_name, trending, CategoryFilter, VenueFilter};
pub use geo::{haversine_m, within_tolerance, Coordinate, GeoError, LocationProvider};
pub use live_events::{current_events, EventCategory, EventStatus, LiveEvent};
pub use matching::{recommend, MatchConfig, MatchOutcome, ScoredVenue};
pub use review::{load_reviews, reviews_for_venue, ReviewDesk, ReviewDraft, ReviewPolicy};
pub use session::Session;
pub use simulate::{CommentSynthesizer, FeedSchedule};
pub use store::{KeyValueStore, MemoryStore};
pub use summary::venue_summary;
pub use user::{AuthorSnapshot, Review, User, Verification};
pub use venue::{ActivityLevel, DayWindow, OpeningHours, Span, Venue, VenueCategory};
pub use vibe::{aggregate_vibe, Vibe};
