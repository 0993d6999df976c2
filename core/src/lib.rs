//! revassign-core — the reviewer-assignment engine.
//!
//! Given a change request and a candidate pool, the engine infers required
//! expertise, balances workload, folds in collaboration affinity, applies
//! hard constraints and team diversity, and returns ranked suggestions or
//! finalized assignments with deadlines.
//!
//! The crate is a library-level API: no wire protocol, no persistence.
//! Callers persist `Assignment` records and feed completed reviews back
//! through `analyze_assignment_effectiveness`.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod expertise;
pub mod person;
pub mod request;
pub mod suggestion;
pub mod types;
pub mod workload;
