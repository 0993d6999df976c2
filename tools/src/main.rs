//! assign-runner: headless demo runner for the reviewer-assignment engine.
//!
//! Usage:
//!   assign-runner --max-reviewers 3 --priority high
//!
//! Builds a small demo roster and change request, runs the engine, and
//! prints ranked suggestions and finalized assignments.

use anyhow::Result;
use chrono::{Duration, Utc};
use revassign_core::{
    config::{AlgorithmConfig, AssignmentConstraints},
    engine::AssignmentEngine,
    person::{AvailabilityState, Person, ReviewPreferences, WorkloadState},
    request::{ChangeRequest, FileDelta},
    types::{ChangeKind, ExpertiseLevel, Priority, SizeClass},
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let max_reviewers = parse_arg(&args, "--max-reviewers", 3usize);
    let priority = args
        .windows(2)
        .find(|w| w[0] == "--priority")
        .map(|w| w[1].as_str())
        .unwrap_or("medium");
    let priority = match priority {
        "low" => Priority::Low,
        "high" => Priority::High,
        "critical" => Priority::Critical,
        _ => Priority::Medium,
    };

    println!("revassign — assign-runner");
    println!("  max_reviewers: {max_reviewers}");
    println!("  priority:      {priority:?}");
    println!();

    let config = AlgorithmConfig {
        constraints: AssignmentConstraints {
            max_reviewers_per_pr: max_reviewers,
            ..AssignmentConstraints::default()
        },
        ..AlgorithmConfig::default()
    };
    let engine = AssignmentEngine::new(config)?;

    let request = demo_request(priority);
    let mut roster = demo_roster();

    log::info!("scoring {} candidates for {}", roster.len(), request.id);
    let suggestions = engine.suggest_reviewers(&request, &mut roster, None);
    println!("Suggestions for {} ({} files):", request.id, request.files.len());
    for (rank, suggestion) in suggestions.iter().enumerate() {
        println!(
            "  #{} {:<10} confidence {:.2}  est {} min  impact {:.2}",
            rank + 1,
            suggestion.person_id,
            suggestion.confidence,
            suggestion.estimated_minutes,
            suggestion.workload_impact,
        );
        for reason in &suggestion.reasons {
            println!("       - [{:?}] {}", reason.kind, reason.description);
        }
    }

    let assignments = engine.assign_reviewers(&request, &mut roster, max_reviewers);
    println!();
    println!("Assignments:");
    for assignment in &assignments {
        println!(
            "  {} -> {}  deadline {}",
            assignment.request_id,
            assignment.person_id,
            assignment.deadline.format("%Y-%m-%d %H:%M UTC"),
        );
    }

    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn demo_request(priority: Priority) -> ChangeRequest {
    ChangeRequest {
        id: "pr-1042".into(),
        author: "erin".into(),
        repository: "web/dashboard".into(),
        files: vec![
            FileDelta::new("src/components/Panel.tsx", ChangeKind::Modified, 5),
            FileDelta::new("src/api/client.ts", ChangeKind::Modified, 3),
            FileDelta::new("docker/Dockerfile", ChangeKind::Modified, 2),
        ],
        size: SizeClass::M,
        priority,
        labels: vec!["frontend".into()],
        required_reviewers: Vec::new(),
        excluded_reviewers: Vec::new(),
        draft: false,
    }
}

fn demo_roster() -> Vec<Person> {
    let now = Utc::now();
    let person = |id: &str, team: &str, skills: &[&str], open: u32, capacity: u32| Person {
        id: id.into(),
        name: id.into(),
        team: team.into(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        expertise: Vec::new(),
        workload: WorkloadState {
            current_open_reviews: open,
            avg_review_hours: 1.5,
            review_capacity: capacity,
            weekly_commit_count: 12,
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
    };

    let mut alice = person("alice", "team-web", &["typescript", "react"], 2, 5);
    alice.expertise.push(revassign_core::person::ExpertiseArea {
        technology: "TypeScript".into(),
        level: ExpertiseLevel::Expert,
        confidence: 0.9,
        last_updated: now,
        evidence_count: 220,
    });

    let mut bob = person("bob", "team-web", &["javascript", "node"], 5, 8);
    bob.expertise.push(revassign_core::person::ExpertiseArea {
        technology: "JavaScript".into(),
        level: ExpertiseLevel::Advanced,
        confidence: 0.75,
        last_updated: now,
        evidence_count: 80,
    });

    let mut diana = person("diana", "team-platform", &["typescript", "docker"], 3, 6);
    diana.expertise.push(revassign_core::person::ExpertiseArea {
        technology: "Docker".into(),
        level: ExpertiseLevel::Advanced,
        confidence: 0.7,
        last_updated: now,
        evidence_count: 60,
    });

    let erin = person("erin", "team-web", &["typescript"], 1, 5);

    vec![alice, bob, diana, erin]
}
