//! Daily mission evaluation and progress
//!
//! ## Overview
//!
//! Two concerns live here:
//! 1. Deciding whether a single mission's rule passes against a check-in
//!    context (`check_rule` / `can_complete_mission`)
//! 2. Computing a user's catalog-wide progress (`user_progress`)
//!
//! Named predicates are dispatched by rule key before the generic operator
//! evaluation. Unrecognized rules are denied rather than auto-completed:
//! a permissive fallback would let any unconstrained mission pay out on
//! every scan.

use std::collections::HashSet;
use tracing::warn;

use crate::backend::GameBackend;
use crate::error::ApiError;
use crate::rules::{CheckInContext, Rule, Value};
use crate::types::Mission;

/// Result of checking one mission against a context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionVerdict {
    pub can_complete: bool,
    /// Human-readable explanation of the verdict
    pub reason: String,
}

impl MissionVerdict {
    fn deny(reason: impl Into<String>) -> Self {
        Self {
            can_complete: false,
            reason: reason.into(),
        }
    }

    fn when(can_complete: bool, reason: impl Into<String>) -> Self {
        Self {
            can_complete,
            reason: reason.into(),
        }
    }
}

/// Evaluate a parsed rule against a check-in context. Pure.
pub fn check_rule(rule: &Rule, ctx: &CheckInContext) -> MissionVerdict {
    match rule.key() {
        "visit_new_place" => {
            MissionVerdict::when(ctx.new_place_visited, "visit a new place today")
        }
        "checkin_category_gastronomia" => MissionVerdict::when(
            ctx.local_category == Some(crate::types::Category::Gastronomy),
            "check in at a gastronomy place",
        ),
        "daily_places_scanned" => match rule {
            Rule::Comparison { op, value, .. } => {
                let count = Value::Number(ctx.daily_places_scanned as f64);
                MissionVerdict::when(
                    op.compare(&count, value),
                    format!(
                        "scan {} places ({}/{})",
                        value.as_number(),
                        ctx.daily_places_scanned,
                        value.as_number()
                    ),
                )
            }
            Rule::Predicate { .. } => MissionVerdict::deny("unrecognized rule"),
        },
        key => match (rule, ctx.get(key)) {
            (Rule::Comparison { op, value, .. }, Some(ctx_value)) => MissionVerdict::when(
                op.compare(&ctx_value, value),
                format!("{} {} {}", key, op, value.as_number()),
            ),
            _ => MissionVerdict::deny("unrecognized rule"),
        },
    }
}

/// Check whether a mission can be completed right now.
///
/// A missing mission denies with "mission not found"; any other fetch or
/// evaluation failure is swallowed into a deny so a broken mission never
/// aborts a check-in.
pub async fn can_complete_mission(
    backend: &dyn GameBackend,
    mission_key: &str,
    ctx: &CheckInContext,
) -> MissionVerdict {
    match backend.get_mission(mission_key).await {
        Ok(mission) => check_rule(&Rule::parse(&mission.rule), ctx),
        Err(ApiError::NotFound(_)) => MissionVerdict::deny("mission not found"),
        Err(e) => {
            warn!(mission = %mission_key, error = %e, "Mission check failed");
            MissionVerdict::deny("error checking mission")
        }
    }
}

/// Completion ratio over the mission catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    pub completed: usize,
    pub total: usize,
    /// `completed / total * 100`; 0 when the catalog is empty
    pub percentage: f64,
}

/// A user's mission progress: what's done, what's still available
#[derive(Debug, Clone)]
pub struct MissionProgress {
    pub completed: Vec<Mission>,
    pub available: Vec<Mission>,
    pub stats: ProgressStats,
}

impl MissionProgress {
    /// Fixed renderable fallback used when the backend cannot be reached
    fn fallback() -> Self {
        let available = vec![
            placeholder(1, "placeholder-1", "Visit a new place", 20, "visit_new_place"),
            placeholder(
                2,
                "placeholder-2",
                "Scan 5 places",
                50,
                "daily_places_scanned>=5",
            ),
            placeholder(
                3,
                "placeholder-3",
                "Check in at a gastronomy spot",
                30,
                "checkin_category_gastronomia",
            ),
        ];
        let total = available.len();
        Self {
            completed: Vec::new(),
            available,
            stats: ProgressStats {
                completed: 0,
                total,
                percentage: 0.0,
            },
        }
    }
}

fn placeholder(id: u64, doc_id: &str, name: &str, points: u32, rule: &str) -> Mission {
    Mission {
        id,
        document_id: Some(doc_id.to_string()),
        name: name.to_string(),
        points,
        rule: rule.to_string(),
        completed_by: Vec::new(),
    }
}

/// Split the catalog into completed/available and compute the ratio. Pure.
pub fn compute_progress(completed: Vec<Mission>, catalog: Vec<Mission>) -> MissionProgress {
    let done: HashSet<String> = completed.iter().map(Mission::key).collect();
    let available: Vec<Mission> = catalog
        .iter()
        .filter(|m| !done.contains(&m.key()))
        .cloned()
        .collect();

    let total = catalog.len();
    let percentage = if total > 0 {
        completed.len() as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    MissionProgress {
        stats: ProgressStats {
            completed: completed.len(),
            total,
            percentage,
        },
        completed,
        available,
    }
}

/// Fetch a user's mission progress.
///
/// Completed set and full catalog are fetched concurrently. Any failure
/// yields the fixed fallback triple so callers always get a renderable
/// shape.
pub async fn user_progress(backend: &dyn GameBackend, user_id: u64) -> MissionProgress {
    match tokio::try_join!(
        backend.completed_missions(user_id),
        backend.list_missions()
    ) {
        Ok((completed, catalog)) => compute_progress(completed, catalog),
        Err(e) => {
            warn!(user_id, error = %e, "Mission progress fetch failed, serving fallback");
            MissionProgress::fallback()
        }
    }
}
