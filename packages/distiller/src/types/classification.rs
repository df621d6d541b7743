//! Stage 4 output: document-level classification metadata.

use serde::{Deserialize, Serialize};

/// Approximate reading difficulty of the source material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Introductory,
    Intermediate,
    Advanced,
}

/// Validated output of the classification stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassificationOutput {
    /// Primary subject area (e.g. "film history", "microbiology")
    pub subject_area: String,

    /// Intended audience description
    pub audience: String,

    pub difficulty: Difficulty,

    /// Recurring themes across the document
    #[serde(default)]
    pub themes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_is_a_closed_set() {
        assert!(serde_json::from_str::<Difficulty>(r#""expert""#).is_err());
        let d: Difficulty = serde_json::from_str(r#""advanced""#).unwrap();
        assert_eq!(d, Difficulty::Advanced);
    }
}
