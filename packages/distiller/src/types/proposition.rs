//! Stage 2 output: atomic factual statements.
//!
//! Cognitive-level taxonomy mapping:
//! - propositions (what the source states): recall through analysis
//! - takeaways (synthesized insight): analysis and evaluation only
//!
//! The two sets are distinct Rust enums, so a proposition can never carry a
//! takeaway-only level. An unrecognized tag fails deserialization outright.

use serde::{Deserialize, Serialize};

/// Allowed cognitive levels for propositions.
///
/// `evaluation` and `creation` are deliberately absent: propositions record
/// what the source states, not what a learner does with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropositionLevel {
    Recall,
    Comprehension,
    Application,
    Analysis,
}

impl PropositionLevel {
    /// All members of the closed set, in ascending cognitive order.
    pub const ALL: [PropositionLevel; 4] = [
        PropositionLevel::Recall,
        PropositionLevel::Comprehension,
        PropositionLevel::Application,
        PropositionLevel::Analysis,
    ];

    /// The serialized tag, for use as a distribution key.
    pub fn name(&self) -> &'static str {
        match self {
            PropositionLevel::Recall => "recall",
            PropositionLevel::Comprehension => "comprehension",
            PropositionLevel::Application => "application",
            PropositionLevel::Analysis => "analysis",
        }
    }
}

/// How a proposition was obtained from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Quoted directly from the source
    Verbatim,
    /// Same fact, reworded
    Restated,
    /// Follows from the text but is not stated outright
    Inferred,
    /// Combined from multiple statements
    Synthesized,
}

/// An atomic factual statement attributed to one content unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposition {
    /// Unique identifier within the document (e.g. "ch01_1.2_p001")
    pub proposition_id: String,

    /// The content unit this fact belongs to
    pub unit_id: String,

    /// The atomic statement itself
    pub text: String,

    /// Cognitive level, drawn from the restricted proposition set
    pub level: PropositionLevel,

    /// Evidentiary pointer into the source (e.g. "¶012")
    pub evidence: String,

    /// How the fact relates to the source text
    pub provenance: Provenance,

    /// Domain tags for filtering and search
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validated output of the proposition stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropositionOutput {
    /// All extracted atomic facts
    pub propositions: Vec<Proposition>,

    /// Optional extraction notes (coverage, distribution)
    #[serde(default)]
    pub notes: Option<String>,
}

impl PropositionOutput {
    /// Whether the given identifier names a proposition in this output.
    pub fn contains(&self, proposition_id: &str) -> bool {
        self.propositions
            .iter()
            .any(|p| p.proposition_id == proposition_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_tags_use_snake_case() {
        let json = serde_json::to_string(&PropositionLevel::Comprehension).unwrap();
        assert_eq!(json, r#""comprehension""#);
    }

    #[test]
    fn takeaway_only_level_is_rejected() {
        // "evaluation" belongs to the takeaway set only
        let result = serde_json::from_str::<PropositionLevel>(r#""evaluation""#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_level_is_rejected_not_coerced() {
        let result = serde_json::from_str::<PropositionLevel>(r#""remembering""#);
        assert!(result.is_err());
    }

    #[test]
    fn provenance_roundtrips() {
        for p in [
            Provenance::Verbatim,
            Provenance::Restated,
            Provenance::Inferred,
            Provenance::Synthesized,
        ] {
            let json = serde_json::to_string(&p).unwrap();
            let back: Provenance = serde_json::from_str(&json).unwrap();
            assert_eq!(back, p);
        }
    }
}
