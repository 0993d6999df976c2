//! Reviewer roster records — people, their expertise, workload, and
//! availability.
//!
//! RULE: People are never deleted, only deactivated. Expertise is the only
//! part of a `Person` the engine mutates (when fresh evidence is supplied);
//! availability is read-only input.

use crate::types::{ExpertiseLevel, PersonId, TeamId, Technology};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub team: TeamId,
    /// Self-declared skills from the roster store, distinct from inferred
    /// expertise. Used for collaboration affinity.
    pub skills: Vec<String>,
    pub expertise: Vec<ExpertiseArea>,
    pub workload: WorkloadState,
    pub availability: AvailabilityState,
    pub preferences: ReviewPreferences,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpertiseArea {
    pub technology: Technology,
    pub level: ExpertiseLevel,
    /// Confidence in this assessment, always clamped to [0, 1].
    pub confidence: f64,
    pub last_updated: DateTime<Utc>,
    pub evidence_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkloadState {
    pub current_open_reviews: u32,
    pub avg_review_hours: f64,
    pub review_capacity: u32,
    pub weekly_commit_count: u32,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityState {
    pub available: bool,
    pub timezone: String,
    /// Offset from UTC in whole hours, used to evaluate working hours.
    pub utc_offset_hours: i32,
    /// Local working window as (start_hour, end_hour), end exclusive.
    pub working_hours: (u32, u32),
    pub out_of_office: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ReviewPreferences {
    pub max_reviews_per_day: Option<u32>,
    /// File extensions (without dot) this person prefers to review.
    pub preferred_file_types: Vec<String>,
    pub avoided_file_types: Vec<String>,
}

// ── Impl ─────────────────────────────────────────────────────────────────────

impl Person {
    /// Mark the person inactive. They stay on the roster but fail every
    /// eligibility check from now on.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.availability.available = false;
    }

    /// Case-insensitive lookup of an expertise area by technology name.
    pub fn expertise_for(&self, technology: &str) -> Option<&ExpertiseArea> {
        self.expertise
            .iter()
            .find(|area| area.technology.eq_ignore_ascii_case(technology))
    }
}

impl WorkloadState {
    pub fn remaining_capacity(&self) -> u32 {
        self.review_capacity.saturating_sub(self.current_open_reviews)
    }
}

impl AvailabilityState {
    pub fn is_out_of_office(&self, now: DateTime<Utc>) -> bool {
        match self.out_of_office {
            Some((start, end)) => now >= start && now < end,
            None => false,
        }
    }

    fn in_working_hours(&self, now: DateTime<Utc>) -> bool {
        let local_hour = (now.hour() as i32 + self.utc_offset_hours).rem_euclid(24) as u32;
        let (start, end) = self.working_hours;
        if start <= end {
            local_hour >= start && local_hour < end
        } else {
            // Window wraps midnight.
            local_hour >= start || local_hour < end
        }
    }

    /// 1.0 inside working hours, 0.5 outside them, 0.0 when unavailable or
    /// out of office.
    pub fn score(&self, now: DateTime<Utc>) -> f64 {
        if !self.available || self.is_out_of_office(now) {
            return 0.0;
        }
        if self.in_working_hours(now) {
            1.0
        } else {
            0.5
        }
    }
}
