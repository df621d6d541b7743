//! Stage 3 output: synthesized insights referencing propositions.

use serde::{Deserialize, Serialize};

/// Allowed cognitive levels for takeaways: higher-order cognition only.
///
/// Disjoint from [`PropositionLevel`](super::proposition::PropositionLevel)
/// at the type level; the spelling "analysis" exists in both taxonomies but
/// the types are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TakeawayLevel {
    Analysis,
    Evaluation,
}

impl TakeawayLevel {
    /// All members of the closed set.
    pub const ALL: [TakeawayLevel; 2] = [TakeawayLevel::Analysis, TakeawayLevel::Evaluation];

    /// The serialized tag, for use as a distribution key.
    pub fn name(&self) -> &'static str {
        match self {
            TakeawayLevel::Analysis => "analysis",
            TakeawayLevel::Evaluation => "evaluation",
        }
    }
}

/// A synthesized insight derived from one or more propositions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Takeaway {
    /// Unique identifier within the document (e.g. "ch01_t001")
    pub takeaway_id: String,

    /// Primary content unit, absent for document-level takeaways
    #[serde(default)]
    pub unit_id: Option<String>,

    /// One-sentence synthesis statement
    pub text: String,

    /// Identifiers of the propositions this takeaway synthesizes (non-empty)
    pub proposition_ids: Vec<String>,

    /// Dominant cognitive level; absent is valid, unknown spellings are not
    #[serde(default)]
    pub level: Option<TakeawayLevel>,

    /// Thematic tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validated output of the takeaway stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TakeawayOutput {
    pub takeaways: Vec<Takeaway>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposition_only_level_is_rejected() {
        for tag in [r#""recall""#, r#""comprehension""#, r#""application""#] {
            assert!(serde_json::from_str::<TakeawayLevel>(tag).is_err());
        }
    }

    #[test]
    fn absent_level_deserializes_to_none() {
        let raw = r#"{
            "takeaway_id": "t001",
            "text": "Insight.",
            "proposition_ids": ["p001"]
        }"#;
        let takeaway: Takeaway = serde_json::from_str(raw).unwrap();
        assert!(takeaway.level.is_none());
    }

    #[test]
    fn level_sets_share_no_serialized_overlap_except_analysis() {
        // The one shared spelling; the types stay distinct regardless.
        let json = serde_json::to_string(&TakeawayLevel::Analysis).unwrap();
        assert_eq!(json, r#""analysis""#);
    }
}
