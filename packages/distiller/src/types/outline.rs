//! Stage 1 output: the document's hierarchical outline.

use serde::{Deserialize, Serialize};

/// A node in the document's hierarchical outline.
///
/// Invariants (enforced by the validation engine, not the type):
/// - a non-root unit's `parent_id` resolves within the same document
/// - a child's `depth` is exactly its parent's depth + 1, roots are depth 1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUnit {
    /// Unique identifier within the document (e.g. "1.2", "3.4.1")
    pub unit_id: String,

    /// Section title or heading
    pub title: String,

    /// Nesting depth, 1 for top-level units
    pub depth: u32,

    /// Ordered position among siblings, starting at 1
    pub position: u32,

    /// `unit_id` of the parent unit, absent for top-level units
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Where the unit begins in the source (e.g. "p.5 ¶2")
    #[serde(default)]
    pub start_location: Option<String>,

    /// Where the unit ends in the source
    #[serde(default)]
    pub end_location: Option<String>,
}

/// A notable entity mentioned in the document (person, organization, concept).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyEntity {
    pub name: String,

    /// Free-form kind tag (e.g. "concept", "person", "organization")
    pub kind: String,
}

/// Validated output of the outline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutlineOutput {
    /// One-paragraph summary of the whole document
    pub summary: String,

    /// Hierarchical breakdown of the document
    pub units: Vec<ContentUnit>,

    /// Important entities mentioned
    #[serde(default)]
    pub key_entities: Vec<KeyEntity>,

    /// Domain-specific keywords and terms
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl OutlineOutput {
    /// Look up a unit by identifier.
    pub fn unit(&self, unit_id: &str) -> Option<&ContentUnit> {
        self.units.iter().find(|u| u.unit_id == unit_id)
    }

    /// Whether the given identifier names a unit in this outline.
    pub fn contains_unit(&self, unit_id: &str) -> bool {
        self.unit(unit_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_lookup_by_id() {
        let outline = OutlineOutput {
            summary: "s".into(),
            units: vec![ContentUnit {
                unit_id: "1.1".into(),
                title: "Intro".into(),
                depth: 1,
                position: 1,
                parent_id: None,
                start_location: None,
                end_location: None,
            }],
            key_entities: vec![],
            keywords: vec![],
        };

        assert!(outline.contains_unit("1.1"));
        assert!(!outline.contains_unit("9.9"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = r#"{"summary":"s","units":[],"surprise":true}"#;
        assert!(serde_json::from_str::<OutlineOutput>(raw).is_err());
    }
}
