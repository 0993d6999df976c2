//! Expertise inference — turns mined git history into per-technology
//! expertise and scores how well a person matches a change request.
//!
//! This model:
//!   1. Infers the technologies a change request needs (extension table +
//!      path heuristics)
//!   2. Scores a person's expertise against that requirement set
//!   3. Folds new activity evidence into stored expertise areas
//!   4. Qualifies evidence against the level tier table

use crate::config::LevelTierTable;
use crate::error::EngineResult;
use crate::evidence::GitAnalysis;
use crate::person::{ExpertiseArea, Person};
use crate::request::ChangeRequest;
use crate::types::{ExpertiseLevel, Technology};
use std::collections::BTreeSet;

// ── Constants ────────────────────────────────────────────────────────────────

/// Fixed extension -> technology table. Unknown extensions are ignored.
const LANGUAGE_TABLE: &[(&str, &str)] = &[
    ("rs", "Rust"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("js", "JavaScript"),
    ("jsx", "JavaScript"),
    ("mjs", "JavaScript"),
    ("py", "Python"),
    ("go", "Go"),
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("rb", "Ruby"),
    ("php", "PHP"),
    ("cs", "C#"),
    ("c", "C"),
    ("h", "C"),
    ("cpp", "C++"),
    ("cc", "C++"),
    ("hpp", "C++"),
    ("swift", "Swift"),
    ("scala", "Scala"),
    ("sql", "SQL"),
    ("sh", "Shell"),
    ("bash", "Shell"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("scss", "CSS"),
    ("vue", "Vue"),
    ("tf", "Terraform"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
];

/// Path-substring heuristics for platform technologies that extensions
/// alone cannot reveal.
const PATH_HEURISTICS: &[(&str, &str)] = &[
    ("dockerfile", "Docker"),
    ("docker-compose", "Docker"),
    ("docker/", "Docker"),
    ("k8s/", "Kubernetes"),
    ("kubernetes/", "Kubernetes"),
    ("helm/", "Kubernetes"),
    ("terraform/", "Terraform"),
    ("package.json", "Node.js"),
    ("package-lock.json", "Node.js"),
    (".github/workflows", "CI"),
];

/// Confidence assigned to freshly qualified evidence, by level. Stored
/// confidence then drifts via evidence-weighted averaging.
const LEVEL_CONFIDENCE: &[(ExpertiseLevel, f64)] = &[
    (ExpertiseLevel::Novice, 0.35),
    (ExpertiseLevel::Intermediate, 0.55),
    (ExpertiseLevel::Advanced, 0.75),
    (ExpertiseLevel::Expert, 0.90),
];

// ── Public types ─────────────────────────────────────────────────────────────

/// Result of scoring one person against a requirement set.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpertiseMatch {
    /// Average matched confidence scaled by requirement coverage, in [0, 1].
    pub score: f64,
    /// Technologies (canonical names) the person matched.
    pub matched: Vec<Technology>,
    /// Level of the single highest-confidence match.
    pub level: ExpertiseLevel,
    /// Confidence of that highest-confidence match.
    pub confidence: f64,
}

impl ExpertiseMatch {
    fn zero() -> Self {
        Self {
            score: 0.0,
            matched: Vec::new(),
            level: ExpertiseLevel::Novice,
            confidence: 0.0,
        }
    }
}

// ── Model ────────────────────────────────────────────────────────────────────

pub struct ExpertiseModel;

impl ExpertiseModel {
    /// Derive the set of technologies a change request requires. An empty
    /// or unrecognizable file list yields an empty set, never an error.
    pub fn infer_required_technologies(request: &ChangeRequest) -> BTreeSet<Technology> {
        let mut required = BTreeSet::new();

        for file in &request.files {
            let path = file.path.to_ascii_lowercase();

            if let Some(ext) = file.extension() {
                if let Some((_, tech)) = LANGUAGE_TABLE.iter().find(|(e, _)| *e == ext) {
                    required.insert((*tech).to_string());
                }
            }

            for (needle, tech) in PATH_HEURISTICS {
                if path.contains(needle) {
                    required.insert((*tech).to_string());
                }
            }

            // The hosting integration sometimes knows the language outright.
            if let Some(language) = &file.language {
                if !language.trim().is_empty() {
                    required.insert(language.clone());
                }
            }
        }

        required
    }

    /// Score a person's expertise against the requirement set.
    ///
    /// score = mean(matched confidences) * (matched / required).
    /// With no required technologies or no matches, everything is zero.
    pub fn match_score(
        expertise: &[ExpertiseArea],
        required: &BTreeSet<Technology>,
    ) -> ExpertiseMatch {
        if required.is_empty() {
            return ExpertiseMatch::zero();
        }

        let mut matched_areas: Vec<&ExpertiseArea> = Vec::new();
        let mut matched_names: Vec<Technology> = Vec::new();
        for tech in required {
            if let Some(area) = expertise
                .iter()
                .find(|area| area.technology.eq_ignore_ascii_case(tech))
            {
                matched_areas.push(area);
                matched_names.push(tech.clone());
            }
        }

        if matched_areas.is_empty() {
            return ExpertiseMatch::zero();
        }

        let avg_confidence: f64 = matched_areas
            .iter()
            .map(|area| area.confidence)
            .sum::<f64>()
            / matched_areas.len() as f64;
        let coverage = matched_areas.len() as f64 / required.len() as f64;

        let best = matched_areas
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .copied();

        ExpertiseMatch {
            score: (avg_confidence * coverage).clamp(0.0, 1.0),
            matched: matched_names,
            level: best.map(|area| area.level).unwrap_or_default(),
            confidence: best.map(|area| area.confidence).unwrap_or(0.0),
        }
    }

    /// Fold new evidence into a person's stored expertise.
    ///
    /// Per technology: the qualified level takes the max against the stored
    /// level; confidence is merged by evidence-count-weighted averaging.
    /// Re-submitting the same evidence increments the count again — callers
    /// own deduplication.
    ///
    /// Returns the person's full expertise list after the merge.
    pub fn update_expertise(
        person: &mut Person,
        evidence: &GitAnalysis,
        tiers: &LevelTierTable,
    ) -> EngineResult<Vec<ExpertiseArea>> {
        evidence.validate()?;

        let new_count = (evidence.commit_count + evidence.review_count).max(1);

        for (language, &lines) in &evidence.language_lines {
            let level = tiers.qualify(evidence.commit_count, lines, evidence.review_count);
            let new_confidence = Self::confidence_for_level(level);

            match person
                .expertise
                .iter_mut()
                .find(|area| area.technology.eq_ignore_ascii_case(language))
            {
                Some(area) => {
                    let merged_count = area.evidence_count + new_count;
                    area.confidence = ((area.confidence * area.evidence_count as f64)
                        + (new_confidence * new_count as f64))
                        / merged_count as f64;
                    area.confidence = area.confidence.clamp(0.0, 1.0);
                    area.level = area.level.max(level);
                    area.evidence_count = merged_count;
                    if evidence.analyzed_at > area.last_updated {
                        area.last_updated = evidence.analyzed_at;
                    }
                }
                None => {
                    person.expertise.push(ExpertiseArea {
                        technology: language.clone(),
                        level,
                        confidence: new_confidence,
                        last_updated: evidence.analyzed_at,
                        evidence_count: new_count,
                    });
                }
            }
        }

        Ok(person.expertise.clone())
    }

    /// Baseline confidence for a freshly qualified level.
    pub fn confidence_for_level(level: ExpertiseLevel) -> f64 {
        LEVEL_CONFIDENCE
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, c)| *c)
            .unwrap_or(0.35)
    }
}
