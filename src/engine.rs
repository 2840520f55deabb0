//! Check-in orchestration
//!
//! ## Overview
//!
//! A check-in ties together the scanned place, the point award, and the
//! daily mission sweep:
//!
//! 1. Precondition: a signed-in user, checked before any network call
//! 2. Resolve place and fresh user record concurrently
//! 3. Duplicate guard: a place already in the user's scanned-today set
//!    short-circuits with zero points and no mutation
//! 4. Base award: additive scanned-today connect, then the place's points
//! 5. Mission sweep: re-evaluate every still-available mission against the
//!    post-scan context; complete and pay out the ones that pass
//! 6. Aggregate all deltas into one outcome
//!
//! Failures at steps 2-4 abort the check-in and propagate. The sweep is
//! best-effort: an individual mission failure is logged and skipped, never
//! aborting the flow (partial mission credit is acceptable). Idempotency
//! relies on backend state read fresh before each mutating decision; there
//! is no client-side lock.

use tracing::{debug, error, info};

use crate::backend::GameBackend;
use crate::error::{ApiError, Result};
use crate::missions;
use crate::notify::Notifier;
use crate::rules::CheckInContext;
use crate::types::CheckInOutcome;

/// Orchestrates check-ins over a backend and a notification sink
pub struct CheckInEngine<'a> {
    backend: &'a dyn GameBackend,
    notifier: &'a dyn Notifier,
}

impl<'a> CheckInEngine<'a> {
    pub fn new(backend: &'a dyn GameBackend, notifier: &'a dyn Notifier) -> Self {
        Self { backend, notifier }
    }

    /// Perform a check-in at the given place.
    ///
    /// Returns the aggregated points earned (place award plus any mission
    /// payouts). A same-day duplicate returns zero points without touching
    /// the backend.
    pub async fn check_in(&self, place_id: u64) -> Result<CheckInOutcome> {
        if !self.backend.is_authenticated() {
            self.notifier.warn("You need to be signed in to check in");
            return Err(ApiError::Unauthenticated);
        }

        let (place, user) =
            match tokio::try_join!(self.backend.get_place(place_id), self.backend.me()) {
                Ok(resolved) => resolved,
                Err(e) => {
                    self.notifier.error("Check-in failed. Try again.");
                    return Err(e);
                }
            };

        if user.scanned_today(place.id) {
            self.notifier.warn("You already visited this place today");
            return Ok(CheckInOutcome::default());
        }

        // The context sees the pre-award snapshot: this scan is new by the
        // guard above, and the daily count includes it.
        let ctx = CheckInContext {
            new_place_visited: true,
            local_category: Some(place.category),
            daily_places_scanned: user.daily_scans.len() as u32 + 1,
            ..Default::default()
        };

        let place_points = place.award() as u64;
        if let Err(e) = self.award_place(user.id, place.id, place_points).await {
            self.notifier.error("Check-in failed. Try again.");
            return Err(e);
        }

        info!(
            place_id = place.id,
            place = %place.name,
            points = place_points,
            "Place check-in recorded"
        );

        let (mission_points, completed_missions) = self.sweep_missions(user.id, &ctx).await;

        let total = place_points + mission_points;
        let message = if mission_points > 0 {
            format!(
                "Check-in complete! You earned {} points + {} mission points!",
                place_points, mission_points
            )
        } else {
            format!("Check-in complete! You earned {} points!", place_points)
        };
        self.notifier.success(&message);

        Ok(CheckInOutcome {
            points_earned: total,
            place_points,
            mission_points,
            completed_missions,
        })
    }

    /// Register the scan and apply the base award. Both mutations must
    /// succeed for the check-in to proceed.
    async fn award_place(&self, user_id: u64, place_id: u64, points: u64) -> Result<()> {
        self.backend.record_daily_scan(user_id, place_id).await?;
        self.backend.add_points(user_id, points).await?;
        Ok(())
    }

    /// Evaluate every available mission against the context; complete and
    /// pay out the ones that pass. Best-effort per mission.
    async fn sweep_missions(&self, user_id: u64, ctx: &CheckInContext) -> (u64, Vec<String>) {
        let progress = missions::user_progress(self.backend, user_id).await;

        let mut mission_points = 0u64;
        let mut completed = Vec::new();

        for mission in &progress.available {
            let key = mission.key();
            let verdict = missions::can_complete_mission(self.backend, &key, ctx).await;
            if !verdict.can_complete {
                debug!(mission = %key, reason = %verdict.reason, "Mission not completable");
                continue;
            }

            if let Err(e) = self.backend.complete_mission(&key, user_id).await {
                error!(mission = %key, error = %e, "Mission completion failed");
                continue;
            }

            if mission.points > 0 {
                if let Err(e) = self.backend.add_points(user_id, mission.points as u64).await {
                    error!(mission = %key, error = %e, "Mission payout failed");
                    continue;
                }
                mission_points += mission.points as u64;
            }

            self.notifier.success(&format!(
                "Mission completed: {}! +{} points!",
                mission.name, mission.points
            ));
            completed.push(mission.name.clone());
        }

        (mission_points, completed)
    }
}
