//! Shared primitive types used across the entire engine.

use serde::{Deserialize, Serialize};

/// A stable, unique identifier for a person (reviewer or author).
pub type PersonId = String;

/// A stable, unique identifier for a change request (pull request).
pub type RequestId = String;

/// An organizational team identifier.
pub type TeamId = String;

/// A technology name ("TypeScript", "Docker", ...). Matching is
/// case-insensitive; storage preserves the original casing.
pub type Technology = String;

/// Demonstrated skill level on a fixed ordinal scale.
/// Ordering is load-bearing: `Novice < Intermediate < Advanced < Expert`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseLevel {
    #[default]
    Novice,
    Intermediate,
    Advanced,
    Expert,
}

/// Review priority of a change request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// T-shirt size class of a change request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Xs,
    S,
    M,
    L,
    Xl,
}

/// What happened to a file in a change request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}
