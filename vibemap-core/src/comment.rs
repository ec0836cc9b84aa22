//! Live comments and the capped per-venue feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::warn;

use crate::error::{Result, VibeError};
use crate::session::Session;
use crate::store::{comments_key, load_json, save_json, KeyValueStore, Loaded};
use crate::user::User;
use crate::venue::{Span, Venue};
use crate::vibe::Vibe;

/// Most-recent comments kept per venue.
pub const FEED_CAP: usize = 15;

/// Karma granted for posting a comment.
pub const COMMENT_KARMA: u64 = 2;

/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveComment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,

    /// Author's 0-5 reputation when the comment was posted.
    #[serde(default)]
    pub reputation: f64,
    #[serde(default)]
    pub karma: u64,

    #[serde(default)]
    pub vibe: Option<Vibe>,
    /// Observed wait, minutes.
    #[serde(default)]
    pub wait_range: Option<Span>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl LiveComment {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        body: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            body: body.into(),
            timestamp,
            reputation: 0.0,
            karma: 0,
            vibe: None,
            wait_range: None,
            images: Vec::new(),
        }
    }

    pub fn with_vibe(mut self, vibe: Vibe) -> Self {
        self.vibe = Some(vibe);
        self
    }

    pub fn with_wait_range(mut self, range: Span) -> Self {
        self.wait_range = Some(range);
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// What a user supplies when posting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentDraft {
    pub body: String,
    pub vibe: Option<Vibe>,
    pub wait_range: Option<Span>,
    pub images: Vec<String>,
}

impl CommentDraft {
    pub fn validate(&self) -> Result<()> {
        if self.body.trim().is_empty() {
            return Err(VibeError::Validation("comment must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Build a comment from a draft, snapshotting the author's standing, and
/// credit the author's karma.
pub fn post_comment(author: &mut User, draft: CommentDraft, now: DateTime<Utc>) -> LiveComment {
    author.add_karma(COMMENT_KARMA);

    LiveComment {
        id: format!("comment_{}_{}", author.id, now.timestamp_millis()),
        author: author.name.clone(),
        body: draft.body,
        timestamp: now,
        reputation: author.reputation,
        karma: author.karma,
        vibe: draft.vibe,
        wait_range: draft.wait_range,
        images: draft.images,
    }
}

/// Append-only comment window; the oldest entry is evicted past `cap`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentFeed {
    cap: usize,
    comments: VecDeque<LiveComment>,
}

impl CommentFeed {
    pub fn new(cap: usize) -> Self {
        Self { cap: cap.max(1), comments: VecDeque::new() }
    }

    /// Seed from an existing oldest-first list, keeping only the newest `cap`.
    pub fn from_comments(comments: Vec<LiveComment>, cap: usize) -> Self {
        let mut feed = Self::new(cap);
        for c in comments {
            feed.push(c);
        }
        feed
    }

    pub fn push(&mut self, comment: LiveComment) {
        self.comments.push_back(comment);
        while self.comments.len() > self.cap {
            self.comments.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LiveComment> {
        self.comments.iter()
    }

    /// Oldest-first copy for handing to a view.
    pub fn snapshot(&self) -> Vec<LiveComment> {
        self.comments.iter().cloned().collect()
    }
}

impl Default for CommentFeed {
    fn default() -> Self {
        Self::new(FEED_CAP)
    }
}

/// Comments users posted to a venue, oldest first. Unreadable data counts as none.
pub fn posted_comments<S: KeyValueStore + ?Sized>(store: &S, venue_id: &str) -> Result<Vec<LiveComment>> {
    Ok(match load_json::<Vec<LiveComment>, S>(store, &comments_key(venue_id))? {
        Loaded::Present(v) => v,
        Loaded::Absent => Vec::new(),
        Loaded::Malformed(e) => {
            warn!(venue = venue_id, error = %e, "stored comments are unreadable; ignoring");
            Vec::new()
        }
    })
}

/// Persist a posted comment, keeping only the newest [`FEED_CAP`].
pub fn record_comment<S: KeyValueStore + ?Sized>(store: &mut S, venue_id: &str, comment: &LiveComment) -> Result<()> {
    let mut feed = CommentFeed::from_comments(posted_comments(store, venue_id)?, FEED_CAP);
    feed.push(comment.clone());
    save_json(store, &comments_key(venue_id), &feed.snapshot())
}

/// Post as the signed-in user: validate, store the comment, then credit
/// karma. A failed store write leaves the profile untouched.
pub fn submit_comment<S: KeyValueStore>(
    session: &mut Session<S>,
    venue_id: &str,
    draft: CommentDraft,
    now: DateTime<Utc>,
) -> Result<LiveComment> {
    draft.validate()?;
    let mut author = session
        .user()
        .cloned()
        .ok_or_else(|| VibeError::Auth("sign in to comment".to_string()))?;

    let comment = post_comment(&mut author, draft, now);
    record_comment(session.store_mut(), venue_id, &comment)?;
    session.update_user(|u| *u = author)?;
    Ok(comment)
}

/// Catalog comments merged with posted ones, by timestamp, capped.
pub fn venue_feed<S: KeyValueStore + ?Sized>(store: &S, venue: &Venue, cap: usize) -> Result<CommentFeed> {
    let mut all = venue.live_comments.clone();
    all.extend(posted_comments(store, &venue.id)?);
    all.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    Ok(CommentFeed::from_comments(all, cap))
}
