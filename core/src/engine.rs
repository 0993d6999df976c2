//! The assignment engine — the heart of the reviewer-assignment core.
//!
//! PIPELINE ORDER (fixed, documented, never reordered):
//!   1. Apply fresh activity evidence to candidate expertise
//!   2. Generate expertise-based suggestions (+ file-ownership bonus)
//!   3. Generate workload/availability-based suggestions
//!   4. Generate collaboration-affinity suggestions
//!   5. Merge by candidate id
//!   6. Filter by hard constraints
//!   7. Enforce team diversity
//!   8. Rank and truncate
//!
//! RULES:
//!   - The config snapshot is captured once at the top of each cycle; no
//!     computation straddles an `update_config` swap.
//!   - Each cycle is a pure function of (request, candidate snapshot,
//!     config snapshot); the only durable mutation is expertise updates.
//!   - Malformed evidence is skipped and logged, never fatal.

use crate::config::{AlgorithmConfig, ConfigPatch, MIN_LEVEL_CONFIDENCE_OVERRIDE};
use crate::error::EngineResult;
use crate::evidence::GitAnalysis;
use crate::expertise::ExpertiseModel;
use crate::person::Person;
use crate::request::ChangeRequest;
use crate::suggestion::{
    Assignment, CompletedReview, EffectivenessReport, Reason, ReasonKind, Suggestion,
};
use crate::types::{ExpertiseLevel, PersonId, TeamId};
use crate::workload::WorkloadModel;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

// ── Constants ────────────────────────────────────────────────────────────────

/// Collaboration affinity for candidates on the author's team.
const SAME_TEAM_AFFINITY: f64 = 0.6;

/// Fraction of the expertise weight granted when a candidate has
/// historically touched one of the changed files.
const OWNERSHIP_BONUS_FACTOR: f64 = 0.2;

// ── Engine ───────────────────────────────────────────────────────────────────

pub struct AssignmentEngine {
    config: RwLock<Arc<AlgorithmConfig>>,
}

impl AssignmentEngine {
    pub fn new(config: AlgorithmConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config: RwLock::new(Arc::new(config)),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: RwLock::new(Arc::new(AlgorithmConfig::default())),
        }
    }

    /// The currently active config snapshot.
    pub fn config(&self) -> Arc<AlgorithmConfig> {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Validate a partial update and atomically swap in the merged config.
    /// On rejection the previous valid config remains active.
    pub fn update_config(&self, patch: &ConfigPatch) -> EngineResult<()> {
        let merged = self.config().merged(patch);
        merged.validate()?;
        let mut guard = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(merged);
        Ok(())
    }

    pub fn suggest_reviewers(
        &self,
        request: &ChangeRequest,
        candidates: &mut [Person],
        evidence: Option<&HashMap<PersonId, GitAnalysis>>,
    ) -> Vec<Suggestion> {
        self.suggest_reviewers_at(Utc::now(), request, candidates, evidence)
    }

    /// Full suggestion cycle with an explicit clock, used directly by tests.
    pub fn suggest_reviewers_at(
        &self,
        now: DateTime<Utc>,
        request: &ChangeRequest,
        candidates: &mut [Person],
        evidence: Option<&HashMap<PersonId, GitAnalysis>>,
    ) -> Vec<Suggestion> {
        let config = self.config();
        self.suggest_with_config(now, request, candidates, evidence, &config)
    }

    /// The pipeline proper, against one already-captured snapshot. Every
    /// public entry point captures exactly one snapshot and threads it
    /// here, so no cycle ever mixes two configs.
    fn suggest_with_config(
        &self,
        now: DateTime<Utc>,
        request: &ChangeRequest,
        candidates: &mut [Person],
        evidence: Option<&HashMap<PersonId, GitAnalysis>>,
        config: &AlgorithmConfig,
    ) -> Vec<Suggestion> {
        // 1. Fold fresh evidence into candidate expertise.
        if let Some(evidence) = evidence {
            for person in candidates.iter_mut() {
                if let Some(record) = evidence.get(&person.id) {
                    if let Err(err) =
                        ExpertiseModel::update_expertise(person, record, &config.level_tiers)
                    {
                        log::warn!("skipping evidence for '{}': {err}", person.id);
                    }
                }
            }
        }

        let candidates: &[Person] = candidates;
        if candidates.is_empty() {
            return Vec::new();
        }

        let estimated_minutes = WorkloadModel::estimate_review_minutes(request, &config.estimate);
        let mut drafts: BTreeMap<PersonId, Suggestion> = BTreeMap::new();

        // 2-4. Independent suggestion sources, merged as they land.
        self.add_expertise_suggestions(
            config,
            request,
            candidates,
            evidence,
            estimated_minutes,
            &mut drafts,
        );
        self.add_workload_suggestions(
            config,
            now,
            request,
            candidates,
            estimated_minutes,
            &mut drafts,
        );
        self.add_collaboration_suggestions(
            config,
            request,
            candidates,
            estimated_minutes,
            &mut drafts,
        );

        // 6. Hard constraint filter.
        let by_id: HashMap<&str, &Person> = candidates
            .iter()
            .map(|person| (person.id.as_str(), person))
            .collect();
        let mut survivors: Vec<Suggestion> = drafts
            .into_values()
            .filter(|suggestion| {
                let Some(person) = by_id.get(suggestion.person_id.as_str()) else {
                    return false;
                };
                if !WorkloadModel::is_eligible(person, request, config, now) {
                    return false;
                }
                suggestion.matched_level >= config.constraints.min_expertise_level
                    || suggestion.confidence > MIN_LEVEL_CONFIDENCE_OVERRIDE
            })
            .collect();

        // 7. Team diversity: keep the single best candidate per team.
        if config.constraints.require_team_diversity {
            survivors = Self::diversify(survivors, &by_id);
        }

        // 8. Rank descending by confidence, stable id tie-break, truncate.
        survivors.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.person_id.cmp(&b.person_id))
        });
        survivors.truncate(config.constraints.max_reviewers_per_pr);
        survivors
    }

    fn add_expertise_suggestions(
        &self,
        config: &AlgorithmConfig,
        request: &ChangeRequest,
        candidates: &[Person],
        evidence: Option<&HashMap<PersonId, GitAnalysis>>,
        estimated_minutes: u32,
        drafts: &mut BTreeMap<PersonId, Suggestion>,
    ) {
        let required = ExpertiseModel::infer_required_technologies(request);

        for person in candidates {
            let matched = ExpertiseModel::match_score(&person.expertise, &required);
            let mut contribution = matched.score * config.weights.expertise;
            let mut reasons = Vec::new();

            if matched.score > 0.0 {
                reasons.push(Reason {
                    kind: ReasonKind::ExpertiseMatch,
                    description: format!(
                        "{:?}-level match on {} of {} required technologies",
                        matched.level,
                        matched.matched.len(),
                        required.len()
                    ),
                    weight_contribution: contribution,
                    evidence: matched.matched.clone(),
                });
            }

            // File-ownership bonus: the candidate has touched changed files.
            if let Some(record) = evidence.and_then(|map| map.get(&person.id)) {
                let owned: Vec<String> = request
                    .files
                    .iter()
                    .filter(|file| record.touched(&file.path))
                    .map(|file| file.path.clone())
                    .collect();
                if !owned.is_empty() {
                    let bonus = config.weights.expertise * OWNERSHIP_BONUS_FACTOR;
                    contribution += bonus;
                    reasons.push(Reason {
                        kind: ReasonKind::FileOwnership,
                        description: format!("previously touched {} changed file(s)", owned.len()),
                        weight_contribution: bonus,
                        evidence: owned,
                    });
                }
            }

            // Merge even at zero contribution so the matched level is
            // visible to the constraint filter.
            Self::merge_into(
                drafts,
                person,
                contribution,
                reasons,
                estimated_minutes,
                matched.level,
            );
        }
    }

    fn add_workload_suggestions(
        &self,
        config: &AlgorithmConfig,
        now: DateTime<Utc>,
        request: &ChangeRequest,
        candidates: &[Person],
        estimated_minutes: u32,
        drafts: &mut BTreeMap<PersonId, Suggestion>,
    ) {
        let scores = WorkloadModel::workload_scores(candidates, &config.workload, now);
        let request_extensions: HashSet<String> = request
            .files
            .iter()
            .filter_map(|file| file.extension())
            .collect();

        for person in candidates {
            let workload_score = scores.get(&person.id).copied().unwrap_or(0.0);
            let availability_score = person.availability.score(now);
            let impact = WorkloadModel::estimate_impact(person, request, &config.estimate);

            let mut contribution = workload_score * config.weights.workload
                + availability_score * config.weights.availability;
            let mut reasons = vec![Reason {
                kind: ReasonKind::WorkloadBalance,
                description: format!(
                    "{} of {} review slots in use",
                    person.workload.current_open_reviews, person.workload.review_capacity
                ),
                weight_contribution: workload_score * config.weights.workload,
                evidence: vec![format!("pool workload score {workload_score:.2}")],
            }];
            if availability_score > 0.0 {
                reasons.push(Reason {
                    kind: ReasonKind::Availability,
                    description: format!("availability score {availability_score:.2}"),
                    weight_contribution: availability_score * config.weights.availability,
                    evidence: Vec::new(),
                });
            }

            if config.preferences.honor_file_type_preferences && !request_extensions.is_empty() {
                let preferred = person
                    .preferences
                    .preferred_file_types
                    .iter()
                    .any(|ext| request_extensions.contains(&ext.to_ascii_lowercase()));
                let avoided = person
                    .preferences
                    .avoided_file_types
                    .iter()
                    .any(|ext| request_extensions.contains(&ext.to_ascii_lowercase()));
                let delta = match (preferred, avoided) {
                    (true, false) => config.preferences.file_type_bonus,
                    (false, true) => -config.preferences.file_type_bonus,
                    _ => 0.0,
                };
                if delta != 0.0 {
                    contribution = (contribution + delta).max(0.0);
                    reasons.push(Reason {
                        kind: ReasonKind::Preference,
                        description: if delta > 0.0 {
                            "request touches preferred file types".into()
                        } else {
                            "request touches avoided file types".into()
                        },
                        weight_contribution: delta,
                        evidence: Vec::new(),
                    });
                }
            }

            let entry = Self::merge_into(
                drafts,
                person,
                contribution,
                reasons,
                estimated_minutes,
                ExpertiseLevel::Novice,
            );
            entry.workload_impact = entry.workload_impact.max(impact);
            entry.availability_score = entry.availability_score.max(availability_score);
        }
    }

    fn add_collaboration_suggestions(
        &self,
        config: &AlgorithmConfig,
        request: &ChangeRequest,
        candidates: &[Person],
        estimated_minutes: u32,
        drafts: &mut BTreeMap<PersonId, Suggestion>,
    ) {
        // The author's team and skills are only known if they are in the
        // pool; without them affinity degrades to zero (never an error).
        let author = candidates.iter().find(|person| person.id == request.author);
        let Some(author) = author else {
            return;
        };
        let author_team = author.team.clone();
        let author_skills: HashSet<String> = author
            .skills
            .iter()
            .map(|skill| skill.to_ascii_lowercase())
            .collect();

        for person in candidates {
            if person.id == request.author {
                continue;
            }
            let (affinity, description) = if person.team == author_team {
                (SAME_TEAM_AFFINITY, "same team as the author".to_string())
            } else if author_skills.is_empty() {
                (0.0, String::new())
            } else {
                let shared = person
                    .skills
                    .iter()
                    .filter(|skill| author_skills.contains(&skill.to_ascii_lowercase()))
                    .count();
                (
                    shared as f64 / author_skills.len() as f64,
                    format!("shares {shared} declared skill(s) with the author"),
                )
            };

            if affinity <= 0.0 {
                continue;
            }
            let contribution = affinity * config.weights.collaboration;
            Self::merge_into(
                drafts,
                person,
                contribution,
                vec![Reason {
                    kind: ReasonKind::CollaborationHistory,
                    description,
                    weight_contribution: contribution,
                    evidence: Vec::new(),
                }],
                estimated_minutes,
                ExpertiseLevel::Novice,
            );
        }
    }

    /// Merge one source's contribution into the per-candidate draft:
    /// confidences sum (clamped to 1), reasons concatenate, numeric
    /// sub-scores take the max.
    fn merge_into<'a>(
        drafts: &'a mut BTreeMap<PersonId, Suggestion>,
        person: &Person,
        contribution: f64,
        reasons: Vec<Reason>,
        estimated_minutes: u32,
        matched_level: ExpertiseLevel,
    ) -> &'a mut Suggestion {
        let entry = drafts
            .entry(person.id.clone())
            .or_insert_with(|| Suggestion {
                person_id: person.id.clone(),
                confidence: 0.0,
                reasons: Vec::new(),
                estimated_minutes,
                workload_impact: 0.0,
                availability_score: 0.0,
                matched_level: ExpertiseLevel::Novice,
            });
        entry.confidence = (entry.confidence + contribution).clamp(0.0, 1.0);
        entry.reasons.extend(reasons);
        entry.estimated_minutes = entry.estimated_minutes.max(estimated_minutes);
        entry.matched_level = entry.matched_level.max(matched_level);
        entry
    }

    /// Keep only the highest-confidence candidate per team, independent of
    /// how many total slots remain.
    fn diversify(
        survivors: Vec<Suggestion>,
        by_id: &HashMap<&str, &Person>,
    ) -> Vec<Suggestion> {
        let mut best_per_team: BTreeMap<TeamId, (Suggestion, bool)> = BTreeMap::new();

        for suggestion in survivors {
            let Some(person) = by_id.get(suggestion.person_id.as_str()) else {
                continue;
            };
            match best_per_team.get_mut(&person.team) {
                Some((current, contested)) => {
                    if suggestion.confidence > current.confidence {
                        *current = suggestion;
                    }
                    *contested = true;
                }
                None => {
                    best_per_team.insert(person.team.clone(), (suggestion, false));
                }
            }
        }

        // Only winners who actually out-competed a teammate get the reason.
        best_per_team
            .into_values()
            .map(|(mut suggestion, contested)| {
                if contested {
                    suggestion.reasons.push(Reason {
                        kind: ReasonKind::TeamDiversity,
                        description: "highest-confidence candidate on their team".into(),
                        weight_contribution: 0.0,
                        evidence: Vec::new(),
                    });
                }
                suggestion
            })
            .collect()
    }

    pub fn assign_reviewers(
        &self,
        request: &ChangeRequest,
        candidates: &mut [Person],
        max_assignments: usize,
    ) -> Vec<Assignment> {
        self.assign_reviewers_at(Utc::now(), request, candidates, max_assignments)
    }

    /// Finalize the top suggestions into assignments with deadlines derived
    /// from the request priority.
    pub fn assign_reviewers_at(
        &self,
        now: DateTime<Utc>,
        request: &ChangeRequest,
        candidates: &mut [Person],
        max_assignments: usize,
    ) -> Vec<Assignment> {
        let config = self.config();
        let suggestions = self.suggest_with_config(now, request, candidates, None, &config);
        let deadline = now + config.deadlines.buffer(request.priority);

        suggestions
            .into_iter()
            .take(max_assignments)
            .map(|suggestion| Assignment {
                id: uuid::Uuid::new_v4().to_string(),
                request_id: request.id.clone(),
                person_id: suggestion.person_id,
                assigned_at: now,
                confidence: suggestion.confidence,
                reasons: suggestion.reasons,
                priority: request.priority,
                estimated_minutes: suggestion.estimated_minutes,
                deadline,
            })
            .collect()
    }

    /// Retrospective quality metrics over past assignments and the reviews
    /// that actually happened.
    pub fn analyze_assignment_effectiveness(
        &self,
        past_assignments: &[Assignment],
        completed_reviews: &[CompletedReview],
    ) -> EffectivenessReport {
        if past_assignments.is_empty() {
            return EffectivenessReport {
                accuracy: 0.0,
                avg_review_minutes: 0.0,
                workload_balance: 1.0,
                suggestions: vec!["no assignment history to analyze".into()],
            };
        }

        let completed_keys: HashSet<(&str, &str)> = completed_reviews
            .iter()
            .map(|review| (review.request_id.as_str(), review.person_id.as_str()))
            .collect();
        let completed_count = past_assignments
            .iter()
            .filter(|a| completed_keys.contains(&(a.request_id.as_str(), a.person_id.as_str())))
            .count();
        let accuracy = completed_count as f64 / past_assignments.len() as f64;

        let avg_review_minutes = if completed_reviews.is_empty() {
            0.0
        } else {
            completed_reviews
                .iter()
                .map(|review| review.actual_minutes as f64)
                .sum::<f64>()
                / completed_reviews.len() as f64
        };

        // Spread of assignments across people: 1 - coefficient of variation.
        let mut per_person: BTreeMap<&str, u32> = BTreeMap::new();
        for assignment in past_assignments {
            *per_person.entry(assignment.person_id.as_str()).or_default() += 1;
        }
        let counts: Vec<f64> = per_person.values().map(|&count| count as f64).collect();
        let mean = counts.iter().sum::<f64>() / counts.len() as f64;
        let variance =
            counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
        let workload_balance = if mean > 0.0 {
            (1.0 - variance.sqrt() / mean).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let mut suggestions = Vec::new();
        if accuracy < 0.5 {
            suggestions.push(
                "fewer than half of assignments produced a review; revisit expertise weighting"
                    .to_string(),
            );
        }
        if workload_balance < 0.5 {
            suggestions.push(
                "assignments are concentrated on few reviewers; raise the workload weight"
                    .to_string(),
            );
        }
        let avg_estimated = past_assignments
            .iter()
            .map(|a| a.estimated_minutes as f64)
            .sum::<f64>()
            / past_assignments.len() as f64;
        if avg_review_minutes > 1.5 * avg_estimated && avg_estimated > 0.0 {
            suggestions.push(
                "actual review time runs well over estimates; raise base_minutes or multipliers"
                    .to_string(),
            );
        }

        EffectivenessReport {
            accuracy,
            avg_review_minutes,
            workload_balance,
            suggestions,
        }
    }
}
