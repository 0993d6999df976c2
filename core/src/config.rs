//! Algorithm configuration — every tunable the engine reads.
//!
//! RULE: No scoring formula hides a magic number. Tier thresholds, weight
//! defaults, deadline buffers, and estimate multipliers all live here so
//! they can be overridden and unit-tested in isolation.
//!
//! The engine holds one `AlgorithmConfig` snapshot per assignment cycle;
//! `ConfigPatch` carries partial updates that are validated before they
//! replace the active snapshot.

use crate::error::{EngineError, EngineResult};
use crate::types::{ExpertiseLevel, Priority, SizeClass};
use chrono::Duration;
use serde::{Deserialize, Serialize};

// ── Weights ──────────────────────────────────────────────────────────────────

/// Relative weight of each suggestion source. Merged confidences are summed
/// and clamped to 1.0, so the weights need not sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreWeights {
    pub expertise: f64,
    pub workload: f64,
    pub availability: f64,
    pub collaboration: f64,
    /// Reserved for callers layering diversity bonuses on top of the
    /// suggestions. The core enforces team diversity as a hard constraint
    /// and never reads this weight.
    pub diversity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            expertise: 0.50,
            workload: 0.25,
            availability: 0.15,
            collaboration: 0.20,
            diversity: 0.10,
        }
    }
}

// ── Constraints ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentConstraints {
    /// Hard cap on the number of suggestions returned per request.
    pub max_reviewers_per_pr: usize,
    /// Candidates below this matched level are dropped unless their merged
    /// confidence exceeds [`MIN_LEVEL_CONFIDENCE_OVERRIDE`].
    pub min_expertise_level: ExpertiseLevel,
    /// Candidates whose marginal workload impact exceeds this are dropped.
    pub max_workload_threshold: f64,
    /// Keep at most one suggestion per team.
    pub require_team_diversity: bool,
    /// Never suggest the request's author as their own reviewer.
    pub avoid_same_author: bool,
}

/// Confidence above which the minimum-expertise constraint is waived.
/// Escape hatch for workload-dominant candidates.
pub const MIN_LEVEL_CONFIDENCE_OVERRIDE: f64 = 0.7;

impl Default for AssignmentConstraints {
    fn default() -> Self {
        Self {
            max_reviewers_per_pr: 3,
            min_expertise_level: ExpertiseLevel::Novice,
            max_workload_threshold: 0.8,
            require_team_diversity: false,
            avoid_same_author: true,
        }
    }
}

// ── Preferences ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceOptions {
    /// Apply the preferred/avoided file-type bonus and penalty.
    pub honor_file_type_preferences: bool,
    /// Enforce each person's `max_reviews_per_day` as an eligibility cap.
    pub honor_max_reviews_per_day: bool,
    /// Confidence delta applied per preference hit (added for preferred
    /// file types, subtracted for avoided ones).
    pub file_type_bonus: f64,
}

impl Default for PreferenceOptions {
    fn default() -> Self {
        Self {
            honor_file_type_preferences: true,
            honor_max_reviews_per_day: true,
            file_type_bonus: 0.05,
        }
    }
}

// ── Expertise level tiers ────────────────────────────────────────────────────

/// Evidence thresholds for one expertise level. A person qualifies for a
/// tier only when ALL three thresholds are met; otherwise they fall to the
/// highest tier fully satisfied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelTier {
    pub level: ExpertiseLevel,
    pub min_commits: u64,
    pub min_lines: u64,
    pub min_reviews: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelTierTable {
    /// Ascending by level. `Novice` is the floor and requires nothing.
    pub tiers: Vec<LevelTier>,
}

impl Default for LevelTierTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                LevelTier {
                    level: ExpertiseLevel::Novice,
                    min_commits: 0,
                    min_lines: 0,
                    min_reviews: 0,
                },
                LevelTier {
                    level: ExpertiseLevel::Intermediate,
                    min_commits: 10,
                    min_lines: 1_000,
                    min_reviews: 5,
                },
                LevelTier {
                    level: ExpertiseLevel::Advanced,
                    min_commits: 50,
                    min_lines: 10_000,
                    min_reviews: 25,
                },
                LevelTier {
                    level: ExpertiseLevel::Expert,
                    min_commits: 200,
                    min_lines: 50_000,
                    min_reviews: 100,
                },
            ],
        }
    }
}

impl LevelTierTable {
    /// Highest tier whose commit, line, and review thresholds are all met.
    pub fn qualify(&self, commits: u64, lines: u64, reviews: u64) -> ExpertiseLevel {
        let mut qualified = ExpertiseLevel::Novice;
        for tier in &self.tiers {
            if commits >= tier.min_commits
                && lines >= tier.min_lines
                && reviews >= tier.min_reviews
            {
                qualified = qualified.max(tier.level);
            }
        }
        qualified
    }
}

// ── Deadline buffers ─────────────────────────────────────────────────────────

/// Hours between assignment and review deadline, per priority.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeadlineBuffers {
    pub critical_hours: i64,
    pub high_hours: i64,
    pub medium_hours: i64,
    pub low_hours: i64,
}

impl Default for DeadlineBuffers {
    fn default() -> Self {
        Self {
            critical_hours: 2,
            high_hours: 8,
            medium_hours: 24,
            low_hours: 72,
        }
    }
}

impl DeadlineBuffers {
    pub fn buffer(&self, priority: Priority) -> Duration {
        let hours = match priority {
            Priority::Critical => self.critical_hours,
            Priority::High => self.high_hours,
            Priority::Medium => self.medium_hours,
            Priority::Low => self.low_hours,
        };
        Duration::hours(hours)
    }
}

// ── Review-time estimate ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewEstimateParams {
    pub base_minutes: f64,
    pub size_multiplier_xs: f64,
    pub size_multiplier_s: f64,
    pub size_multiplier_m: f64,
    pub size_multiplier_l: f64,
    pub size_multiplier_xl: f64,
    /// Per-point multiplier applied to the summed file complexity.
    pub complexity_factor: f64,
    pub priority_multiplier_low: f64,
    pub priority_multiplier_medium: f64,
    pub priority_multiplier_high: f64,
    pub priority_multiplier_critical: f64,
}

impl Default for ReviewEstimateParams {
    fn default() -> Self {
        Self {
            base_minutes: 30.0,
            size_multiplier_xs: 0.5,
            size_multiplier_s: 1.0,
            size_multiplier_m: 2.0,
            size_multiplier_l: 4.0,
            size_multiplier_xl: 8.0,
            complexity_factor: 0.1,
            priority_multiplier_low: 0.8,
            priority_multiplier_medium: 1.0,
            priority_multiplier_high: 1.5,
            priority_multiplier_critical: 2.0,
        }
    }
}

impl ReviewEstimateParams {
    pub fn size_multiplier(&self, size: SizeClass) -> f64 {
        match size {
            SizeClass::Xs => self.size_multiplier_xs,
            SizeClass::S => self.size_multiplier_s,
            SizeClass::M => self.size_multiplier_m,
            SizeClass::L => self.size_multiplier_l,
            SizeClass::Xl => self.size_multiplier_xl,
        }
    }

    pub fn priority_multiplier(&self, priority: Priority) -> f64 {
        match priority {
            Priority::Low => self.priority_multiplier_low,
            Priority::Medium => self.priority_multiplier_medium,
            Priority::High => self.priority_multiplier_high,
            Priority::Critical => self.priority_multiplier_critical,
        }
    }
}

// ── Workload scoring parameters ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkloadParams {
    /// Weight of (open reviews / capacity) in the raw load.
    pub open_review_weight: f64,
    /// Weight of (average review hours / duration_norm_hours).
    pub duration_weight: f64,
    /// Hours of average review time that count as a full duration load.
    pub duration_norm_hours: f64,
}

impl Default for WorkloadParams {
    fn default() -> Self {
        Self {
            open_review_weight: 0.6,
            duration_weight: 0.3,
            duration_norm_hours: 4.0,
        }
    }
}

// ── Top-level config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AlgorithmConfig {
    pub weights: ScoreWeights,
    pub constraints: AssignmentConstraints,
    pub preferences: PreferenceOptions,
    pub level_tiers: LevelTierTable,
    pub deadlines: DeadlineBuffers,
    pub estimate: ReviewEstimateParams,
    pub workload: WorkloadParams,
}

impl AlgorithmConfig {
    /// Reject configurations the engine cannot score with. On `Err` the
    /// caller keeps the previous valid config active.
    pub fn validate(&self) -> EngineResult<()> {
        let w = &self.weights;
        for (name, value) in [
            ("expertise", w.expertise),
            ("workload", w.workload),
            ("availability", w.availability),
            ("collaboration", w.collaboration),
            ("diversity", w.diversity),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(EngineError::ConfigInvalid {
                    reason: format!("weight '{name}' must be finite and >= 0, got {value}"),
                });
            }
        }

        if self.constraints.max_reviewers_per_pr == 0 {
            return Err(EngineError::ConfigInvalid {
                reason: "max_reviewers_per_pr must be >= 1".into(),
            });
        }

        let threshold = self.constraints.max_workload_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(EngineError::ConfigInvalid {
                reason: format!("max_workload_threshold must be in (0, 1], got {threshold}"),
            });
        }

        if self.estimate.base_minutes <= 0.0 {
            return Err(EngineError::ConfigInvalid {
                reason: "estimate.base_minutes must be > 0".into(),
            });
        }

        for hours in [
            self.deadlines.critical_hours,
            self.deadlines.high_hours,
            self.deadlines.medium_hours,
            self.deadlines.low_hours,
        ] {
            if hours <= 0 {
                return Err(EngineError::ConfigInvalid {
                    reason: "deadline buffers must be positive hours".into(),
                });
            }
        }

        Ok(())
    }

    /// Apply a partial update, returning the merged config. `self` is
    /// untouched; the caller swaps the result in only after `validate()`.
    pub fn merged(&self, patch: &ConfigPatch) -> AlgorithmConfig {
        let mut next = self.clone();
        if let Some(weights) = &patch.weights {
            next.weights = weights.clone();
        }
        if let Some(constraints) = &patch.constraints {
            next.constraints = constraints.clone();
        }
        if let Some(preferences) = &patch.preferences {
            next.preferences = preferences.clone();
        }
        if let Some(level_tiers) = &patch.level_tiers {
            next.level_tiers = level_tiers.clone();
        }
        if let Some(deadlines) = &patch.deadlines {
            next.deadlines = deadlines.clone();
        }
        if let Some(estimate) = &patch.estimate {
            next.estimate = estimate.clone();
        }
        if let Some(workload) = &patch.workload {
            next.workload = workload.clone();
        }
        next
    }
}

/// Partial config update. Sections left `None` keep their current values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConfigPatch {
    pub weights: Option<ScoreWeights>,
    pub constraints: Option<AssignmentConstraints>,
    pub preferences: Option<PreferenceOptions>,
    pub level_tiers: Option<LevelTierTable>,
    pub deadlines: Option<DeadlineBuffers>,
    pub estimate: Option<ReviewEstimateParams>,
    pub workload: Option<WorkloadParams>,
}
