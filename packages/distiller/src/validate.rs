//! Validation engine for stage outputs and the assembled document.
//!
//! Every check collects the complete list of violations rather than bailing
//! on the first, so a single failing stage surfaces all defects in one
//! round-trip. Dangling references are violations, never warnings.
//!
//! The closed cognitive-level enumerations are enforced at the type level:
//! serde rejects an unrecognized tag before validation ever sees it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::extractor::Stage;
use crate::types::analysis::DocumentAnalysis;
use crate::types::outline::OutlineOutput;
use crate::types::proposition::PropositionOutput;
use crate::types::takeaway::TakeawayOutput;

/// One structural or referential defect found in a stage output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub stage: Stage,

    /// Identifier of the offending entity, when one exists
    pub entity_id: Option<String>,

    /// Field or relation the defect concerns
    pub field: String,

    pub message: String,
}

impl Violation {
    fn new(
        stage: Stage,
        entity_id: Option<&str>,
        field: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            entity_id: entity_id.map(str::to_string),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity_id {
            Some(id) => write!(f, "[{}] {} ({}): {}", self.stage, id, self.field, self.message),
            None => write!(f, "[{}] {}: {}", self.stage, self.field, self.message),
        }
    }
}

/// Check the outline stage output: unique unit ids, resolvable parents,
/// depth arithmetic, sane sibling positions.
pub fn validate_outline(outline: &OutlineOutput) -> Vec<Violation> {
    let stage = Stage::Outline;
    let mut violations = Vec::new();

    if outline.units.is_empty() {
        violations.push(Violation::new(
            stage,
            None,
            "units",
            "outline contains no content units",
        ));
        return violations;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for unit in &outline.units {
        if unit.unit_id.trim().is_empty() {
            violations.push(Violation::new(stage, None, "unit_id", "empty unit identifier"));
            continue;
        }
        if !seen.insert(unit.unit_id.as_str()) {
            violations.push(Violation::new(
                stage,
                Some(&unit.unit_id),
                "unit_id",
                "duplicate unit identifier",
            ));
        }
        if unit.title.trim().is_empty() {
            violations.push(Violation::new(
                stage,
                Some(&unit.unit_id),
                "title",
                "unit has no title",
            ));
        }
        if unit.position == 0 {
            violations.push(Violation::new(
                stage,
                Some(&unit.unit_id),
                "position",
                "sibling position must start at 1",
            ));
        }
    }

    let depths: HashMap<&str, u32> = outline
        .units
        .iter()
        .map(|u| (u.unit_id.as_str(), u.depth))
        .collect();

    for unit in &outline.units {
        match &unit.parent_id {
            None => {
                if unit.depth != 1 {
                    violations.push(Violation::new(
                        stage,
                        Some(&unit.unit_id),
                        "depth",
                        format!("root unit must have depth 1, found {}", unit.depth),
                    ));
                }
            }
            Some(parent_id) => match depths.get(parent_id.as_str()) {
                None => violations.push(Violation::new(
                    stage,
                    Some(&unit.unit_id),
                    "parent_id",
                    format!("parent unit '{}' does not exist", parent_id),
                )),
                Some(parent_depth) => {
                    if unit.depth != parent_depth + 1 {
                        violations.push(Violation::new(
                            stage,
                            Some(&unit.unit_id),
                            "depth",
                            format!(
                                "depth {} is not parent depth {} + 1",
                                unit.depth, parent_depth
                            ),
                        ));
                    }
                }
            },
        }
    }

    violations
}

/// Check the proposition stage output against the validated outline.
pub fn validate_propositions(
    propositions: &PropositionOutput,
    outline: &OutlineOutput,
) -> Vec<Violation> {
    let stage = Stage::Propositions;
    let mut violations = Vec::new();

    let mut seen: HashSet<&str> = HashSet::new();
    for prop in &propositions.propositions {
        if prop.proposition_id.trim().is_empty() {
            violations.push(Violation::new(
                stage,
                None,
                "proposition_id",
                "empty proposition identifier",
            ));
            continue;
        }
        if !seen.insert(prop.proposition_id.as_str()) {
            violations.push(Violation::new(
                stage,
                Some(&prop.proposition_id),
                "proposition_id",
                "duplicate proposition identifier",
            ));
        }
        if prop.text.trim().is_empty() {
            violations.push(Violation::new(
                stage,
                Some(&prop.proposition_id),
                "text",
                "proposition has no text",
            ));
        }
        if prop.evidence.trim().is_empty() {
            violations.push(Violation::new(
                stage,
                Some(&prop.proposition_id),
                "evidence",
                "proposition has no evidence locator",
            ));
        }
        if !outline.contains_unit(&prop.unit_id) {
            violations.push(Violation::new(
                stage,
                Some(&prop.proposition_id),
                "unit_id",
                format!("references nonexistent unit '{}'", prop.unit_id),
            ));
        }
    }

    violations
}

/// Check the takeaway stage output against validated outline and propositions.
pub fn validate_takeaways(
    takeaways: &TakeawayOutput,
    outline: &OutlineOutput,
    propositions: &PropositionOutput,
) -> Vec<Violation> {
    let stage = Stage::Takeaways;
    let mut violations = Vec::new();

    let mut seen: HashSet<&str> = HashSet::new();
    for takeaway in &takeaways.takeaways {
        if takeaway.takeaway_id.trim().is_empty() {
            violations.push(Violation::new(
                stage,
                None,
                "takeaway_id",
                "empty takeaway identifier",
            ));
            continue;
        }
        if !seen.insert(takeaway.takeaway_id.as_str()) {
            violations.push(Violation::new(
                stage,
                Some(&takeaway.takeaway_id),
                "takeaway_id",
                "duplicate takeaway identifier",
            ));
        }
        if takeaway.text.trim().is_empty() {
            violations.push(Violation::new(
                stage,
                Some(&takeaway.takeaway_id),
                "text",
                "takeaway has no text",
            ));
        }
        if takeaway.proposition_ids.is_empty() {
            violations.push(Violation::new(
                stage,
                Some(&takeaway.takeaway_id),
                "proposition_ids",
                "takeaway must reference at least one proposition",
            ));
        }
        for prop_id in &takeaway.proposition_ids {
            if !propositions.contains(prop_id) {
                violations.push(Violation::new(
                    stage,
                    Some(&takeaway.takeaway_id),
                    "proposition_ids",
                    format!("references nonexistent proposition '{}'", prop_id),
                ));
            }
        }
        if let Some(unit_id) = &takeaway.unit_id {
            if !outline.contains_unit(unit_id) {
                violations.push(Violation::new(
                    stage,
                    Some(&takeaway.takeaway_id),
                    "unit_id",
                    format!("references nonexistent unit '{}'", unit_id),
                ));
            }
        }
    }

    violations
}

/// Whole-document pass: re-runs every per-stage check plus a global
/// uniqueness check across all entity identifiers.
pub fn validate_analysis(analysis: &DocumentAnalysis) -> Vec<Violation> {
    let mut violations = validate_outline(&analysis.outline);
    violations.extend(validate_propositions(&analysis.propositions, &analysis.outline));
    violations.extend(validate_takeaways(
        &analysis.takeaways,
        &analysis.outline,
        &analysis.propositions,
    ));

    // Global uniqueness: no two entities anywhere share an identifier.
    let mut seen: HashMap<&str, &'static str> = HashMap::new();
    let ids = analysis
        .outline
        .units
        .iter()
        .map(|u| (u.unit_id.as_str(), "unit"))
        .chain(
            analysis
                .propositions
                .propositions
                .iter()
                .map(|p| (p.proposition_id.as_str(), "proposition")),
        )
        .chain(
            analysis
                .takeaways
                .takeaways
                .iter()
                .map(|t| (t.takeaway_id.as_str(), "takeaway")),
        );

    for (id, kind) in ids {
        if let Some(other) = seen.insert(id, kind) {
            // Per-stage checks already report duplicates within one kind.
            if other != kind {
                violations.push(Violation::new(
                    Stage::Classification,
                    Some(id),
                    "id",
                    format!("identifier shared between {} and {}", other, kind),
                ));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use crate::types::outline::ContentUnit;

    #[test]
    fn valid_fixture_has_no_violations() {
        let analysis = fixtures::valid_analysis();
        assert!(validate_analysis(&analysis).is_empty());
    }

    #[test]
    fn dangling_parent_is_reported() {
        let mut outline = fixtures::three_unit_outline();
        outline.units[2].parent_id = Some("missing".into());
        let violations = validate_outline(&outline);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "parent_id");
    }

    #[test]
    fn child_depth_must_be_parent_plus_one() {
        let mut outline = fixtures::three_unit_outline();
        outline.units[1].depth = 3; // parent "A" has depth 1
        let violations = validate_outline(&outline);
        assert_eq!(violations.len(), 2); // B itself, and C whose parent B is now depth 3
        assert!(violations.iter().all(|v| v.field == "depth"));
    }

    #[test]
    fn root_depth_must_be_one() {
        let outline = OutlineOutput {
            summary: "s".into(),
            units: vec![ContentUnit {
                unit_id: "A".into(),
                title: "A".into(),
                depth: 2,
                position: 1,
                parent_id: None,
                start_location: None,
                end_location: None,
            }],
            key_entities: vec![],
            keywords: vec![],
        };
        let violations = validate_outline(&outline);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn empty_outline_is_a_violation() {
        let outline = OutlineOutput {
            summary: "s".into(),
            units: vec![],
            key_entities: vec![],
            keywords: vec![],
        };
        assert_eq!(validate_outline(&outline).len(), 1);
    }

    #[test]
    fn proposition_with_unknown_unit_is_reported() {
        let outline = fixtures::three_unit_outline();
        let mut props = fixtures::five_propositions();
        props.propositions[0].unit_id = "nope".into();
        let violations = validate_propositions(&props, &outline);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].entity_id.as_deref(), Some("p001"));
    }

    #[test]
    fn dangling_takeaway_reference_is_exactly_one_violation_naming_it() {
        let outline = fixtures::three_unit_outline();
        let props = fixtures::five_propositions();
        let mut takeaways = fixtures::two_takeaways();
        takeaways.takeaways[0].proposition_ids[1] = "p999".into();

        let violations = validate_takeaways(&takeaways, &outline, &props);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("p999"));
    }

    #[test]
    fn empty_takeaway_identifier_is_reported() {
        let outline = fixtures::three_unit_outline();
        let props = fixtures::five_propositions();
        let mut takeaways = fixtures::two_takeaways();
        takeaways.takeaways[0].takeaway_id = "  ".into();

        let violations = validate_takeaways(&takeaways, &outline, &props);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "takeaway_id");
        assert!(violations[0].entity_id.is_none());
    }

    #[test]
    fn takeaway_without_references_is_a_violation() {
        let outline = fixtures::three_unit_outline();
        let props = fixtures::five_propositions();
        let mut takeaways = fixtures::two_takeaways();
        takeaways.takeaways[1].proposition_ids.clear();

        let violations = validate_takeaways(&takeaways, &outline, &props);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "proposition_ids");
    }

    #[test]
    fn all_violations_are_collected_not_just_the_first() {
        let outline = fixtures::three_unit_outline();
        let mut props = fixtures::five_propositions();
        props.propositions[0].unit_id = "nope".into();
        props.propositions[1].text = "  ".into();
        props.propositions[2].evidence = String::new();

        let violations = validate_propositions(&props, &outline);
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn cross_kind_id_collision_is_reported_globally() {
        let mut analysis = fixtures::valid_analysis();
        analysis.takeaways.takeaways[0].takeaway_id = "p001".into();
        let violations = validate_analysis(&analysis);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("proposition"));
        assert!(violations[0].message.contains("takeaway"));
    }
}
