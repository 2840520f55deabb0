//! Client-side session state
//!
//! The backend owns every durable fact; the client persists only an auth
//! token and a cached user snapshot, stored together in one JSON file and
//! cleared together on logout. `AppState` is the single state container the
//! composition root owns: reads go through accessors, writes go through the
//! named mutations (login, logout, points, record-visit). The cached user is
//! soft state, replaced wholesale by the server record after each mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::types::{AuthResponse, User};

/// Persisted session: fixed `token` and `user` keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// JSON-file-backed session storage
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the stored session; a missing file is an empty session
    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Persist the session (write to a sibling temp file, then rename)
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(session)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Remove the stored session entirely
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// A place visited in this process, with its timestamp
#[derive(Debug, Clone)]
pub struct VisitedPlace {
    pub place_id: u64,
    pub visited_at: DateTime<Utc>,
}

/// Application state container owned by the composition root
pub struct AppState {
    store: SessionStore,
    session: Session,
    /// Point delta applied locally but not yet confirmed by a server read
    pending_points: u64,
    /// Places visited during this process (the backend tracks the daily set)
    visited: Vec<VisitedPlace>,
}

impl AppState {
    /// Load state from the session store
    pub fn load(store: SessionStore) -> Result<Self> {
        let session = store.load()?;
        Ok(Self {
            store,
            session,
            pending_points: 0,
            visited: Vec::new(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    /// Current point total including any unconfirmed local delta
    pub fn points(&self) -> u64 {
        self.session.user.as_ref().map_or(0, |u| u.points) + self.pending_points
    }

    /// Store the token and user from a successful login or registration
    pub fn login(&mut self, auth: AuthResponse) -> Result<()> {
        self.session.token = Some(auth.jwt);
        self.session.user = Some(auth.user);
        self.pending_points = 0;
        self.store.save(&self.session)
    }

    /// Clear token and cached user together
    pub fn logout(&mut self) -> Result<()> {
        self.session = Session::default();
        self.pending_points = 0;
        self.visited.clear();
        self.store.clear()
    }

    /// Apply an optimistic point delta, pending server confirmation
    pub fn add_points_pending(&mut self, delta: u64) {
        self.pending_points += delta;
    }

    /// Replace the cached user with the authoritative server record,
    /// discarding any pending delta
    pub fn reconcile_user(&mut self, user: User) -> Result<()> {
        self.session.user = Some(user);
        self.pending_points = 0;
        self.store.save(&self.session)
    }

    /// Record a visit made during this process
    pub fn record_visit(&mut self, place_id: u64) {
        self.visited.push(VisitedPlace {
            place_id,
            visited_at: Utc::now(),
        });
    }

    pub fn visited(&self) -> &[VisitedPlace] {
        &self.visited
    }
}
