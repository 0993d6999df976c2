//! Historical-activity evidence consumed from the external history-mining
//! service. The engine only reads these records; it never produces them.

use crate::error::{EngineError, EngineResult};
use crate::types::PersonId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One person's mined git history: commit and review volume, per-language
/// line counts, and the set of files they have touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitAnalysis {
    pub person_id: PersonId,
    pub commit_count: u64,
    pub review_count: u64,
    /// Language name -> lines authored in that language.
    pub language_lines: HashMap<String, u64>,
    /// Paths this person has historically touched.
    pub files_touched: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

impl GitAnalysis {
    /// Reject records the expertise model cannot safely consume. Malformed
    /// records are skipped (and logged) by the caller, never fatal.
    pub fn validate(&self) -> EngineResult<()> {
        if self.person_id.is_empty() {
            return Err(EngineError::EvidenceMalformed {
                person_id: "<empty>".into(),
                reason: "empty person id".into(),
            });
        }
        if let Some(language) = self
            .language_lines
            .keys()
            .find(|language| language.trim().is_empty())
        {
            return Err(EngineError::EvidenceMalformed {
                person_id: self.person_id.clone(),
                reason: format!("blank language key {language:?}"),
            });
        }
        Ok(())
    }

    /// True when the analysis shows this person touched `path`.
    pub fn touched(&self, path: &str) -> bool {
        self.files_touched.iter().any(|touched| touched == path)
    }
}
