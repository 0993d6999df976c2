//! Workload model tests: review-time estimation, impact, pool scoring,
//! eligibility, and future-load prediction.

use chrono::{Duration, TimeZone, Utc};
use revassign_core::config::{AlgorithmConfig, ReviewEstimateParams, WorkloadParams};
use revassign_core::person::{AvailabilityState, Person, ReviewPreferences, WorkloadState};
use revassign_core::request::{ChangeRequest, FileDelta};
use revassign_core::types::{ChangeKind, Priority, SizeClass};
use revassign_core::workload::WorkloadModel;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

fn person(id: &str, open: u32, capacity: u32) -> Person {
    Person {
        id: id.into(),
        name: id.into(),
        team: "team-a".into(),
        skills: Vec::new(),
        expertise: Vec::new(),
        workload: WorkloadState {
            current_open_reviews: open,
            avg_review_hours: 1.5,
            review_capacity: capacity,
            weekly_commit_count: 10,
            last_activity: now() - Duration::hours(4),
        },
        availability: AvailabilityState {
            available: true,
            timezone: "UTC".into(),
            utc_offset_hours: 0,
            working_hours: (9, 18),
            out_of_office: None,
        },
        preferences: ReviewPreferences::default(),
        active: true,
    }
}

fn request(size: SizeClass, priority: Priority, complexities: &[u8]) -> ChangeRequest {
    ChangeRequest {
        id: "pr-7".into(),
        author: "author".into(),
        repository: "repo".into(),
        files: complexities
            .iter()
            .enumerate()
            .map(|(i, &c)| FileDelta::new(format!("src/f{i}.rs"), ChangeKind::Modified, c))
            .collect(),
        size,
        priority,
        labels: Vec::new(),
        required_reviewers: Vec::new(),
        excluded_reviewers: Vec::new(),
        draft: false,
    }
}

/// base 30 x size x (1 + 0.1 * total complexity) x priority, rounded up.
#[test]
fn review_minutes_follow_the_multiplier_table() {
    let params = ReviewEstimateParams::default();

    // 30 * 2 * (1 + 0.1*10) * 1.5 = 180
    let medium_high = request(SizeClass::M, Priority::High, &[5, 3, 2]);
    assert_eq!(WorkloadModel::estimate_review_minutes(&medium_high, &params), 180);

    // 30 * 0.5 * 1.1 * 0.8 = 13.2 -> 14
    let tiny_low = request(SizeClass::Xs, Priority::Low, &[1]);
    assert_eq!(WorkloadModel::estimate_review_minutes(&tiny_low, &params), 14);

    // 30 * 8 * (1 + 0.1*10) * 2.0 = 960
    let huge_critical = request(SizeClass::Xl, Priority::Critical, &[10]);
    assert_eq!(WorkloadModel::estimate_review_minutes(&huge_critical, &params), 960);
}

/// Impact = minutes / (remaining capacity x avg review minutes), clamped.
#[test]
fn impact_is_fraction_of_remaining_capacity() {
    let params = ReviewEstimateParams::default();
    let req = request(SizeClass::M, Priority::High, &[5, 3, 2]); // 180 min

    let reviewer = person("a", 2, 5); // remaining 3, avg 90 min
    let impact = WorkloadModel::estimate_impact(&reviewer, &req, &params);
    assert!((impact - 180.0 / 270.0).abs() < 1e-9, "got {impact}");

    let full = person("b", 5, 5);
    assert_eq!(WorkloadModel::estimate_impact(&full, &req, &params), 1.0);

    let mut no_history = person("c", 0, 5);
    no_history.workload.avg_review_hours = 0.0;
    assert_eq!(WorkloadModel::estimate_impact(&no_history, &req, &params), 1.0);
}

/// The least-loaded candidate scores 1 (before the capacity factor); the
/// most loaded scores 0. All scores stay in [0, 1].
#[test]
fn pool_scores_are_normalized() {
    let params = WorkloadParams::default();
    let pool = vec![person("a", 2, 5), person("b", 5, 8)];
    let scores = WorkloadModel::workload_scores(&pool, &params, now());

    let a = scores["a"];
    let b = scores["b"];
    assert!((a - 1.0).abs() < 1e-9, "a = {a}");
    assert!((b - 0.0).abs() < 1e-9, "b = {b}");
    for score in scores.values() {
        assert!((0.0..=1.0).contains(score));
    }
}

/// Workload monotonicity: 2/5 load beats 5/8 load, all else equal.
#[test]
fn lighter_load_scores_higher() {
    let params = WorkloadParams::default();
    let pool = vec![person("light", 2, 5), person("heavy", 5, 8)];
    let scores = WorkloadModel::workload_scores(&pool, &params, now());
    assert!(scores["light"] >= scores["heavy"]);
}

/// A uniform pool normalizes to the 0.5 midpoint.
#[test]
fn uniform_pool_scores_midpoint() {
    let params = WorkloadParams::default();
    let pool = vec![person("solo", 0, 5)];
    let scores = WorkloadModel::workload_scores(&pool, &params, now());
    assert!((scores["solo"] - 0.5).abs() < 1e-9);
}

/// Zero capacity pins the score to zero regardless of normalization.
#[test]
fn zero_capacity_scores_zero() {
    let params = WorkloadParams::default();
    let pool = vec![person("a", 1, 4), person("none", 0, 0)];
    let scores = WorkloadModel::workload_scores(&pool, &params, now());
    assert_eq!(scores["none"], 0.0);
}

/// Inactivity scales the raw load by the recency multiplier.
#[test]
fn stale_activity_decays_raw_load() {
    let params = WorkloadParams::default();
    let mut stale = person("stale", 3, 6);
    stale.workload.last_activity = now() - Duration::days(30);
    let fresh = person("fresh", 3, 6);

    let scores = WorkloadModel::workload_scores(&[fresh, stale], &params, now());
    // Identical loads, but the stale raw load is multiplied by 0.3, so the
    // two normalize to opposite ends of the pool.
    assert!((scores["stale"] - scores["fresh"]).abs() > 0.1);
}

/// Future load extrapolates the weekly review rate, capped at capacity.
#[test]
fn future_load_is_capped_at_capacity() {
    let reviewer = person("a", 2, 5); // avg 1.5h -> ~26.7 reviews/week
    let predicted = WorkloadModel::predict_future_load(&reviewer, 7, now());
    assert_eq!(predicted.current_open_reviews, 5);
    assert_eq!(predicted.review_capacity, 5);

    let unchanged = WorkloadModel::predict_future_load(&reviewer, 0, now());
    assert_eq!(unchanged.current_open_reviews, 2);

    let mut idle = person("b", 1, 8);
    idle.workload.avg_review_hours = 0.0;
    let predicted_idle = WorkloadModel::predict_future_load(&idle, 14, now());
    assert_eq!(predicted_idle.current_open_reviews, 1);
}

/// Eligibility gates: availability, OOO, author avoidance, exclusion,
/// impact threshold, and the per-day preference cap.
#[test]
fn eligibility_gates_drop_hard_failures() {
    let config = AlgorithmConfig::default();
    let req = request(SizeClass::S, Priority::Medium, &[2]);

    let ok = person("ok", 1, 5);
    assert!(WorkloadModel::is_eligible(&ok, &req, &config, now()));

    let mut unavailable = person("unavailable", 1, 5);
    unavailable.availability.available = false;
    assert!(!WorkloadModel::is_eligible(&unavailable, &req, &config, now()));

    let mut away = person("away", 1, 5);
    away.availability.out_of_office = Some((now() - Duration::days(1), now() + Duration::days(3)));
    assert!(!WorkloadModel::is_eligible(&away, &req, &config, now()));

    let author = person("author", 1, 5);
    assert!(!WorkloadModel::is_eligible(&author, &req, &config, now()));

    let excluded = person("banned", 1, 5);
    let mut req_excluding = req.clone();
    req_excluding.excluded_reviewers.push("banned".into());
    assert!(!WorkloadModel::is_eligible(&excluded, &req_excluding, &config, now()));

    let overloaded = person("overloaded", 5, 5);
    assert!(!WorkloadModel::is_eligible(&overloaded, &req, &config, now()));

    let mut capped = person("capped", 2, 8);
    capped.preferences.max_reviews_per_day = Some(2);
    assert!(!WorkloadModel::is_eligible(&capped, &req, &config, now()));

    let mut deactivated = person("gone", 1, 5);
    deactivated.deactivate();
    assert!(!WorkloadModel::is_eligible(&deactivated, &req, &config, now()));
}
