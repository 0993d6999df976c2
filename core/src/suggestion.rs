//! Engine outputs — ranked suggestions, finalized assignments, and the
//! effectiveness report.
//!
//! Suggestions are ephemeral: produced fresh per request and never
//! persisted by this core. Assignments are the terminal output the caller
//! stores.

use crate::types::{ExpertiseLevel, PersonId, Priority, RequestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub person_id: PersonId,
    /// Overall recommendation strength, always in [0, 1].
    pub confidence: f64,
    pub reasons: Vec<Reason>,
    pub estimated_minutes: u32,
    /// Marginal workload impact of accepting this assignment, in [0, 1].
    pub workload_impact: f64,
    pub availability_score: f64,
    /// Best matched level, for the minimum-expertise constraint.
    pub matched_level: ExpertiseLevel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    ExpertiseMatch,
    WorkloadBalance,
    Availability,
    CollaborationHistory,
    FileOwnership,
    TeamDiversity,
    Preference,
}

/// Explanatory record attached to a suggestion. Never a ranking input on
/// its own; the contribution is already folded into the confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reason {
    pub kind: ReasonKind,
    pub description: String,
    pub weight_contribution: f64,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub request_id: RequestId,
    pub person_id: PersonId,
    pub assigned_at: DateTime<Utc>,
    pub confidence: f64,
    pub reasons: Vec<Reason>,
    pub priority: Priority,
    pub estimated_minutes: u32,
    pub deadline: DateTime<Utc>,
}

/// A finished review, reported back by the caller for effectiveness
/// analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedReview {
    pub request_id: RequestId,
    pub person_id: PersonId,
    pub completed_at: DateTime<Utc>,
    pub actual_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectivenessReport {
    /// Fraction of past assignments that produced a completed review.
    pub accuracy: f64,
    pub avg_review_minutes: f64,
    /// 1 - coefficient of variation of per-person assignment counts,
    /// clamped to [0, 1]. 1.0 means perfectly even spread.
    pub workload_balance: f64,
    /// Human-readable tuning advice.
    pub suggestions: Vec<String>,
}
