//! Canned one-line venue summaries built from activity, category and reviews.

use crate::review::average_rating;
use crate::user::Review;
use crate::venue::{ActivityLevel, Venue, VenueCategory};

fn activity_phrase(level: ActivityLevel) -> &'static str {
    match level {
        ActivityLevel::VeryBusy => "buzzing with energy",
        ActivityLevel::ModeratelyBusy => "lively and active",
        ActivityLevel::SomeActivity => "comfortably busy",
        ActivityLevel::Available => "quiet and relaxed",
    }
}

fn category_phrase(category: VenueCategory) -> &'static str {
    match category {
        VenueCategory::Bar => "great spot for drinks",
        VenueCategory::Club => "vibrant nightlife scene",
        VenueCategory::Restaurant => "delicious food",
        VenueCategory::Salon => "professional service",
        VenueCategory::Coffee => "cozy atmosphere",
    }
}

fn reception_phrase(avg: f64) -> &'static str {
    if avg >= 4.5 {
        "highly recommended"
    } else if avg >= 3.5 {
        "well-liked"
    } else {
        "mixed reviews"
    }
}

pub fn venue_summary(venue: &Venue, reviews: &[Review]) -> String {
    let activity = activity_phrase(venue.activity_level());
    let category = category_phrase(venue.category);

    if reviews.is_empty() {
        return format!("{} is {} - {}.", venue.name, activity, category);
    }

    format!(
        "{} is {} with {} from recent visitors - {}.",
        venue.name,
        activity,
        reception_phrase(average_rating(reviews)),
        category
    )
}
