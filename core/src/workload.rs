//! Workload balancing — comparative load scoring across a candidate pool
//! and marginal-impact estimation for one more review.
//!
//! This model:
//!   1. Scores each candidate's load relative to the pool (higher = freer)
//!   2. Estimates review minutes for a change request
//!   3. Estimates the fractional capacity impact of one more assignment
//!   4. Gates candidates on hard eligibility rules
//!   5. Extrapolates future load over a horizon

use crate::config::{AlgorithmConfig, ReviewEstimateParams, WorkloadParams};
use crate::person::{Person, WorkloadState};
use crate::request::ChangeRequest;
use crate::types::PersonId;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

// ── Constants ────────────────────────────────────────────────────────────────

/// Activity-recency multipliers applied to the raw load. Inactive people
/// decay toward a low raw load, which still scores poorly once the capacity
/// factor is applied.
const RECENCY_WITHIN_1_DAY: f64 = 1.0;
const RECENCY_WITHIN_3_DAYS: f64 = 0.8;
const RECENCY_WITHIN_7_DAYS: f64 = 0.6;
const RECENCY_STALE: f64 = 0.3;

/// Reviewing hours assumed per week when extrapolating future load.
const WEEKLY_REVIEW_HOURS: f64 = 40.0;

// ── Model ────────────────────────────────────────────────────────────────────

pub struct WorkloadModel;

impl WorkloadModel {
    fn recency_multiplier(last_activity: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let idle = now.signed_duration_since(last_activity);
        if idle <= Duration::days(1) {
            RECENCY_WITHIN_1_DAY
        } else if idle <= Duration::days(3) {
            RECENCY_WITHIN_3_DAYS
        } else if idle <= Duration::days(7) {
            RECENCY_WITHIN_7_DAYS
        } else {
            RECENCY_STALE
        }
    }

    fn raw_load(workload: &WorkloadState, params: &WorkloadParams, now: DateTime<Utc>) -> f64 {
        let utilization = if workload.review_capacity == 0 {
            1.0
        } else {
            workload.current_open_reviews as f64 / workload.review_capacity as f64
        };
        let duration_load = workload.avg_review_hours / params.duration_norm_hours;

        (params.open_review_weight * utilization + params.duration_weight * duration_load)
            * Self::recency_multiplier(workload.last_activity, now)
    }

    /// Capacity headroom factor in [0, 1]. Zero remaining capacity pins the
    /// score near zero regardless of pool normalization.
    fn capacity_factor(workload: &WorkloadState) -> f64 {
        if workload.review_capacity == 0 {
            return 0.0;
        }
        if workload.current_open_reviews == 0 {
            return 1.0;
        }
        let ratio = workload.review_capacity as f64 / workload.current_open_reviews as f64;
        ratio.min(2.0) / 2.0
    }

    /// Comparative workload score per candidate, in [0, 1]. The least
    /// loaded candidate in the pool scores highest (min raw load -> 1,
    /// max raw load -> 0), then the capacity factor is applied.
    pub fn workload_scores(
        candidates: &[Person],
        params: &WorkloadParams,
        now: DateTime<Utc>,
    ) -> HashMap<PersonId, f64> {
        let raw: Vec<(PersonId, f64, f64)> = candidates
            .iter()
            .map(|person| {
                (
                    person.id.clone(),
                    Self::raw_load(&person.workload, params, now),
                    Self::capacity_factor(&person.workload),
                )
            })
            .collect();

        let min = raw.iter().map(|(_, r, _)| *r).fold(f64::INFINITY, f64::min);
        let max = raw
            .iter()
            .map(|(_, r, _)| *r)
            .fold(f64::NEG_INFINITY, f64::max);
        let spread = max - min;

        raw.into_iter()
            .map(|(id, load, capacity)| {
                let normalized = if spread > f64::EPSILON {
                    1.0 - (load - min) / spread
                } else {
                    // Uniform pool: nobody is comparatively freer.
                    0.5
                };
                (id, (normalized * capacity).clamp(0.0, 1.0))
            })
            .collect()
    }

    /// Estimated review minutes: base * size * (1 + factor * total
    /// complexity) * priority, rounded up.
    pub fn estimate_review_minutes(
        request: &ChangeRequest,
        params: &ReviewEstimateParams,
    ) -> u32 {
        let minutes = params.base_minutes
            * params.size_multiplier(request.size)
            * (1.0 + params.complexity_factor * request.total_complexity() as f64)
            * params.priority_multiplier(request.priority);
        minutes.ceil() as u32
    }

    /// Fractional increase in review burden from one more assignment,
    /// clamped to [0, 1]. No remaining capacity means full impact.
    pub fn estimate_impact(
        person: &Person,
        request: &ChangeRequest,
        params: &ReviewEstimateParams,
    ) -> f64 {
        let minutes = Self::estimate_review_minutes(request, params) as f64;
        let remaining = person.workload.remaining_capacity() as f64;
        let avg_minutes = person.workload.avg_review_hours * 60.0;
        if remaining <= 0.0 || avg_minutes <= 0.0 {
            return 1.0;
        }
        (minutes / (remaining * avg_minutes)).clamp(0.0, 1.0)
    }

    /// Hard eligibility gate. Everything here is a drop, never a ranking
    /// input.
    pub fn is_eligible(
        person: &Person,
        request: &ChangeRequest,
        config: &AlgorithmConfig,
        now: DateTime<Utc>,
    ) -> bool {
        if !person.active || !person.availability.available {
            return false;
        }
        if person.availability.is_out_of_office(now) {
            return false;
        }
        if config.constraints.avoid_same_author && person.id == request.author {
            return false;
        }
        if request.excluded_reviewers.contains(&person.id) {
            return false;
        }
        if Self::estimate_impact(person, request, &config.estimate)
            > config.constraints.max_workload_threshold
        {
            return false;
        }
        if config.preferences.honor_max_reviews_per_day {
            if let Some(cap) = person.preferences.max_reviews_per_day {
                if person.workload.current_open_reviews >= cap {
                    return false;
                }
            }
        }
        true
    }

    /// Linear extrapolation of review intake over `horizon_days`, capped at
    /// total capacity. The weekly review rate is derived from throughput
    /// (weekly reviewing hours / average review duration) since no arrival
    /// series is available.
    pub fn predict_future_load(
        person: &Person,
        horizon_days: u32,
        now: DateTime<Utc>,
    ) -> WorkloadState {
        let workload = &person.workload;
        let weekly_rate = if workload.avg_review_hours > 0.0 {
            WEEKLY_REVIEW_HOURS / workload.avg_review_hours
        } else {
            0.0
        };
        let projected_new = (weekly_rate / 7.0 * horizon_days as f64).round() as u32;
        let projected_open = workload
            .current_open_reviews
            .saturating_add(projected_new)
            .min(workload.review_capacity);

        WorkloadState {
            current_open_reviews: projected_open,
            avg_review_hours: workload.avg_review_hours,
            review_capacity: workload.review_capacity,
            weekly_commit_count: workload.weekly_commit_count,
            last_activity: now,
        }
    }
}
