//! Backend seam for the check-in and mission flows
//!
//! The orchestrator and the progress tracker talk to the backend through this
//! trait rather than to `ApiClient` directly, which allows in-memory doubles
//! in tests. All mutating operations are additive: relation connects never
//! remove existing entries, and point deltas are never negative.

use crate::error::Result;
use crate::types::{Mission, Place, User};

/// Operations the gamification flows need from the backend.
#[async_trait::async_trait]
pub trait GameBackend: Send + Sync {
    /// Whether a signed-in user is present (check-in precondition)
    fn is_authenticated(&self) -> bool;

    /// Fetch a place by id
    async fn get_place(&self, place_id: u64) -> Result<Place>;

    /// Fetch the authenticated user's fresh record
    async fn me(&self) -> Result<User>;

    /// Add the place to the user's scanned-today relation (additive connect)
    async fn record_daily_scan(&self, user_id: u64, place_id: u64) -> Result<()>;

    /// Add `delta` to the user's point total and return the refreshed record.
    ///
    /// The returned record is read back from the backend after the write; it
    /// is the source of truth, not a locally incremented copy.
    async fn add_points(&self, user_id: u64, delta: u64) -> Result<User>;

    /// Fetch the full mission catalog
    async fn list_missions(&self) -> Result<Vec<Mission>>;

    /// Fetch the missions already completed by the user
    async fn completed_missions(&self, user_id: u64) -> Result<Vec<Mission>>;

    /// Fetch a mission by its stable key
    async fn get_mission(&self, key: &str) -> Result<Mission>;

    /// Mark a mission completed for the user (additive connect)
    async fn complete_mission(&self, key: &str, user_id: u64) -> Result<()>;
}
