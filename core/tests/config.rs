//! Config validation and hot-swap tests.

use chrono::{Duration, TimeZone, Utc};
use revassign_core::config::{
    AlgorithmConfig, AssignmentConstraints, ConfigPatch, DeadlineBuffers, ReviewEstimateParams,
    ScoreWeights,
};
use revassign_core::engine::AssignmentEngine;
use revassign_core::error::EngineError;
use revassign_core::person::{AvailabilityState, Person, ReviewPreferences, WorkloadState};
use revassign_core::request::{ChangeRequest, FileDelta};
use revassign_core::types::{ChangeKind, Priority, SizeClass};

/// The default configuration is valid as shipped.
#[test]
fn default_config_validates() {
    assert!(AlgorithmConfig::default().validate().is_ok());
}

/// Negative weights are rejected at update time.
#[test]
fn negative_weights_are_rejected() {
    let engine = AssignmentEngine::with_defaults();
    let patch = ConfigPatch {
        weights: Some(ScoreWeights {
            expertise: -1.0,
            ..ScoreWeights::default()
        }),
        ..ConfigPatch::default()
    };

    let result = engine.update_config(&patch);
    assert!(matches!(result, Err(EngineError::ConfigInvalid { .. })));
}

/// A zero reviewer cap can never be scored against.
#[test]
fn zero_reviewer_cap_is_rejected() {
    let engine = AssignmentEngine::with_defaults();
    let patch = ConfigPatch {
        constraints: Some(AssignmentConstraints {
            max_reviewers_per_pr: 0,
            ..AssignmentConstraints::default()
        }),
        ..ConfigPatch::default()
    };
    assert!(engine.update_config(&patch).is_err());
}

/// The workload threshold must stay inside (0, 1].
#[test]
fn out_of_range_threshold_is_rejected() {
    let engine = AssignmentEngine::with_defaults();
    let patch = ConfigPatch {
        constraints: Some(AssignmentConstraints {
            max_workload_threshold: 1.5,
            ..AssignmentConstraints::default()
        }),
        ..ConfigPatch::default()
    };
    assert!(engine.update_config(&patch).is_err());
}

/// After a rejected update the previous valid config remains active.
#[test]
fn rejected_update_keeps_previous_config() {
    let engine = AssignmentEngine::with_defaults();
    let before = engine.config();

    let patch = ConfigPatch {
        weights: Some(ScoreWeights {
            workload: f64::NAN,
            ..ScoreWeights::default()
        }),
        ..ConfigPatch::default()
    };
    assert!(engine.update_config(&patch).is_err());

    let after = engine.config();
    assert_eq!(before.weights, after.weights);
    assert_eq!(
        after.weights.workload,
        ScoreWeights::default().workload
    );
}

/// A valid partial update swaps in atomically; untouched sections keep
/// their values.
#[test]
fn partial_update_merges_into_snapshot() {
    let engine = AssignmentEngine::with_defaults();
    let patch = ConfigPatch {
        constraints: Some(AssignmentConstraints {
            max_reviewers_per_pr: 1,
            ..AssignmentConstraints::default()
        }),
        ..ConfigPatch::default()
    };
    engine.update_config(&patch).unwrap();

    let config = engine.config();
    assert_eq!(config.constraints.max_reviewers_per_pr, 1);
    // Untouched sections keep defaults.
    assert_eq!(config.weights, ScoreWeights::default());
    assert_eq!(config.estimate.base_minutes, 30.0);
}

/// One assignment cycle reads exactly one config snapshot: with a writer
/// thread hot-swapping estimate and deadline settings, every assignment's
/// estimated minutes and deadline must agree with the same snapshot —
/// never a mix of two.
#[test]
fn assignment_cycle_reads_one_config_snapshot() {
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
    let mut pool = vec![Person {
        id: "riley".into(),
        name: "riley".into(),
        team: "team-a".into(),
        skills: Vec::new(),
        expertise: Vec::new(),
        workload: WorkloadState {
            current_open_reviews: 1,
            avg_review_hours: 1.5,
            review_capacity: 5,
            weekly_commit_count: 10,
            last_activity: now - Duration::hours(4),
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
    }];
    let request = ChangeRequest {
        id: "pr-race".into(),
        author: "someone-else".into(),
        repository: "repo".into(),
        files: vec![
            FileDelta::new("src/a.rs", ChangeKind::Modified, 3),
            FileDelta::new("src/b.rs", ChangeKind::Modified, 3),
        ],
        size: SizeClass::M,
        priority: Priority::Low,
        labels: Vec::new(),
        required_reviewers: Vec::new(),
        excluded_reviewers: Vec::new(),
        draft: false,
    };

    // Snapshot A: base 30 min, low-priority buffer 72 h -> estimate 77.
    // Snapshot B: base 60 min, low-priority buffer 24 h -> estimate 154.
    let patch = |base_minutes: f64, low_hours: i64| ConfigPatch {
        estimate: Some(ReviewEstimateParams {
            base_minutes,
            ..ReviewEstimateParams::default()
        }),
        deadlines: Some(DeadlineBuffers {
            low_hours,
            ..DeadlineBuffers::default()
        }),
        ..ConfigPatch::default()
    };

    let engine = AssignmentEngine::with_defaults();
    std::thread::scope(|scope| {
        let writer = scope.spawn(|| {
            for i in 0..500 {
                let update = if i % 2 == 0 {
                    patch(60.0, 24)
                } else {
                    patch(30.0, 72)
                };
                engine.update_config(&update).unwrap();
            }
        });

        for _ in 0..200 {
            let assignments = engine.assign_reviewers_at(now, &request, &mut pool, 1);
            for assignment in &assignments {
                let consistent_a = assignment.estimated_minutes == 77
                    && assignment.deadline == now + Duration::hours(72);
                let consistent_b = assignment.estimated_minutes == 154
                    && assignment.deadline == now + Duration::hours(24);
                assert!(
                    consistent_a || consistent_b,
                    "assignment mixed two config snapshots: {} min, deadline {}",
                    assignment.estimated_minutes,
                    assignment.deadline
                );
            }
        }

        writer.join().unwrap();
    });
}

/// Constructing an engine from an invalid config fails outright.
#[test]
fn invalid_initial_config_is_rejected() {
    let config = AlgorithmConfig {
        constraints: AssignmentConstraints {
            max_reviewers_per_pr: 0,
            ..AssignmentConstraints::default()
        },
        ..AlgorithmConfig::default()
    };
    assert!(AssignmentEngine::new(config).is_err());
}
