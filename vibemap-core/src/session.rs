//! Mock authentication over the persistence port.
//!
//! There is no credential check beyond "the cached profile has this email";
//! the session exists so trust and karma updates land somewhere durable.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{Result, VibeError};
use crate::store::{load_json, save_json, KeyValueStore, Loaded, USER_KEY};
use crate::user::User;

pub struct Session<S: KeyValueStore> {
    store: S,
    user: Option<User>,
}

impl<S: KeyValueStore> Session<S> {
    /// Load the cached user, or synthesize and persist the demo identity when
    /// nothing usable is stored.
    pub fn open(mut store: S, now: DateTime<Utc>) -> Result<Self> {
        let user = match load_json::<User, _>(&store, USER_KEY)? {
            Loaded::Present(mut u) => {
                u.migrate_legacy();
                u
            }
            Loaded::Absent => {
                debug!("no cached user; creating demo identity");
                let u = User::demo(now);
                save_json(&mut store, USER_KEY, &u)?;
                u
            }
            Loaded::Malformed(e) => {
                warn!(error = %e, "cached user is unreadable; starting fresh");
                let u = User::demo(now);
                save_json(&mut store, USER_KEY, &u)?;
                u
            }
        };

        Ok(Self { store, user: Some(user) })
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Succeeds only when the cached profile carries this email.
    pub fn login(&mut self, email: &str, _password: &str) -> Result<&User> {
        let cached = load_json::<User, _>(&self.store, USER_KEY)?.ok();
        match cached {
            Some(mut u) if u.email.eq_ignore_ascii_case(email.trim()) => {
                u.migrate_legacy();
                self.user = Some(u);
                self.current()
            }
            _ => Err(VibeError::Auth("Invalid credentials".to_string())),
        }
    }

    /// Replace the cached profile with a zeroed one.
    pub fn signup(&mut self, email: &str, _password: &str, name: &str, now: DateTime<Utc>) -> Result<&User> {
        if name.trim().is_empty() {
            return Err(VibeError::Auth("Name is required".to_string()));
        }
        if email.trim().is_empty() {
            return Err(VibeError::Auth("Email is required".to_string()));
        }

        let user = User::new(
            format!("user_{}", now.timestamp_millis()),
            email.trim(),
            name.trim(),
            now,
        );
        save_json(&mut self.store, USER_KEY, &user)?;
        self.user = Some(user);
        self.current()
    }

    pub fn logout(&mut self) -> Result<()> {
        self.store.remove(USER_KEY)?;
        self.user = None;
        Ok(())
    }

    /// Apply an in-place change to the signed-in user and persist it.
    pub fn update_user<F: FnOnce(&mut User)>(&mut self, f: F) -> Result<&User> {
        let Some(user) = self.user.as_mut() else {
            return Err(VibeError::Auth("not signed in".to_string()));
        };
        f(user);
        save_json(&mut self.store, USER_KEY, &*user)?;
        self.current()
    }

    fn current(&self) -> Result<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| VibeError::Auth("not signed in".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 20, 18, 0, 0).unwrap()
    }

    #[test]
    fn malformed_cached_user_falls_back_to_default_identity() {
        let mut store = MemoryStore::new();
        store.save(USER_KEY, "{\"id\": oops".to_string()).unwrap();

        let session = Session::open(store, now()).unwrap();
        let u = session.user().unwrap();
        assert_eq!(u.id, "user_demo");
        assert_eq!(u.trustability, 0);
        assert_eq!(u.karma, 0);

        // The repaired profile is written back.
        let stored: User = load_json(session.store(), USER_KEY).unwrap().ok().unwrap();
        assert_eq!(stored, *u);
    }

    #[test]
    fn first_load_synthesizes_demo_user() {
        let session = Session::open(MemoryStore::new(), now()).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().email, "demo@vibemap.local");
    }

    #[test]
    fn legacy_profile_gets_reputation_on_load() {
        let mut store = MemoryStore::new();
        store
            .save(
                USER_KEY,
                r#"{"id":"u1","email":"a@b.c","name":"ana","trustability":80,"total_reviews":3,"created_at":"2026-01-01T00:00:00Z"}"#
                    .to_string(),
            )
            .unwrap();

        let session = Session::open(store, now()).unwrap();
        let u = session.user().unwrap();
        assert_eq!(u.reputation, 4.0);
        assert_eq!(u.karma, 0);
    }

    #[test]
    fn login_requires_matching_cached_email() {
        let mut session = Session::open(MemoryStore::new(), now()).unwrap();
        session.signup("ana@example.com", "pw", "Ana", now()).unwrap();
        session.logout().unwrap();
        assert!(!session.is_authenticated());

        // Logout dropped the cache, so nothing can log in.
        let err = session.login("ana@example.com", "pw").unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");

        session.signup("ana@example.com", "pw", "Ana", now()).unwrap();
        assert!(session.login("bob@example.com", "pw").is_err());
        assert_eq!(session.login("ANA@example.com", "pw").unwrap().name, "Ana");
    }

    #[test]
    fn signup_requires_a_name() {
        let mut session = Session::open(MemoryStore::new(), now()).unwrap();
        let err = session.signup("a@b.c", "pw", "  ", now()).unwrap_err();
        assert!(matches!(err, VibeError::Auth(_)));
    }

    #[test]
    fn update_user_persists() {
        let mut session = Session::open(MemoryStore::new(), now()).unwrap();
        session.update_user(|u| u.add_karma(7)).unwrap();

        let store = session.into_store();
        let reopened = Session::open(store, now()).unwrap();
        assert_eq!(reopened.user().unwrap().karma, 7);
    }

    #[test]
    fn update_after_logout_is_an_auth_error() {
        let mut session = Session::open(MemoryStore::new(), now()).unwrap();
        session.logout().unwrap();
        assert!(matches!(session.update_user(|u| u.add_karma(1)), Err(VibeError::Auth(_))));
    }
}
