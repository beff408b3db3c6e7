//! Diff rule pipeline.
//!
//! A rule is a pure function from `(documents, items)` to findings; rules
//! never observe each other's output, and precedence (keyed > strict-text >
//! reverse > the rest) is encoded purely as registration order. A pipeline
//! guardrail runs first: too few extracted items means the extraction itself
//! failed and the run reports that instead of producing noise.

pub mod keyed;
pub mod missing_element;
pub mod policy;
pub mod reverse;
pub mod strict_text;
pub mod structure;
pub mod visibility;

use tracing::debug;

use crate::matching::NodeIndex;
use crate::model::{
    CanonicalDocument, Decision, Finding, RequirementItem, RequirementKind, Severity,
};

/// Decision reason codes — greppable strings carried in `Decision::reason`.
pub mod reason {
    pub const CONFIRMED_MISSING: &str = "confirmed_missing";
    pub const NORMALIZATION_GAP: &str = "present_in_capture_text_normalization_failed";
    pub const LOW_SIMILARITY: &str = "low_similarity";
    pub const KEY_ABSENT: &str = "key_absent";
    pub const KEY_TEXT_DIFFERS: &str = "key_text_differs";
    pub const KEY_UNCLAIMED: &str = "key_unclaimed_by_spec";
    pub const NOT_IN_SPEC: &str = "not_mentioned_in_spec";
    pub const VISIBILITY_MISMATCH: &str = "visibility_mismatch";
    pub const UNEVALUATED: &str = "unevaluated_no_match";
    pub const POLICY_ABSENT: &str = "policy_text_absent";
    pub const EMPTY_DOCUMENT: &str = "empty_document";
    pub const NO_ROOT: &str = "no_recognizable_root";
    pub const EXTRACTION_INSUFFICIENT: &str = "extraction_insufficient";
}

/// Finding categories.
pub mod category {
    pub const MISSING_ELEMENT: &str = "MISSING_ELEMENT";
    pub const TEXT_MISMATCH: &str = "TEXT_MISMATCH";
    pub const EXTRA_ELEMENT: &str = "EXTRA_ELEMENT";
    pub const UNMAPPED_TEXT: &str = "UNMAPPED_TEXT";
    pub const VISIBILITY: &str = "VISIBILITY";
    pub const POLICY: &str = "POLICY";
    pub const STRUCTURE: &str = "STRUCTURE";
    pub const EXTRACTION: &str = "EXTRACTION";
}

/// Stable id of the guardrail finding, so callers can gate on it.
pub const GUARDRAIL_FINDING_ID: &str = "guardrail:spec-items-insufficient";

/// Everything a rule may read. Built once per pipeline run.
pub struct RuleContext<'a> {
    pub documents: &'a [CanonicalDocument],
    pub items: &'a [RequirementItem],
    pub index: NodeIndex<'a>,
    /// Concatenated text/name surface of every capture node, lowercased —
    /// the "was it captured at all, even if normalization lost it" haystack.
    pub capture_text: String,
    /// Concatenated spec-side surface (spec-platform nodes + item texts),
    /// lowercased — the reverse rule's "is it mentioned anywhere" haystack.
    pub spec_text: String,
}

impl<'a> RuleContext<'a> {
    pub fn build(documents: &'a [CanonicalDocument], items: &'a [RequirementItem]) -> Self {
        let index = NodeIndex::build(documents);

        let mut capture_text = String::new();
        let mut spec_text = String::new();
        for doc in documents {
            let sink = if doc.platform.is_capture() {
                &mut capture_text
            } else {
                &mut spec_text
            };
            for node in &doc.nodes {
                for part in [node.text.as_deref(), node.name.as_deref()] {
                    if let Some(part) = part {
                        sink.push_str(&part.to_lowercase());
                        sink.push('\n');
                    }
                }
            }
        }
        for item in items {
            if let Some(text) = item.text.as_deref() {
                spec_text.push_str(&text.to_lowercase());
                spec_text.push('\n');
            }
        }

        Self { documents, items, index, capture_text, spec_text }
    }

    /// Capture document for one platform, if that surface was supplied.
    pub fn document(&self, platform: crate::model::Platform) -> Option<&'a CanonicalDocument> {
        self.documents.iter().find(|d| d.platform == platform)
    }
}

/// One comparison strategy. `apply` is pure and total.
pub trait DiffRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, ctx: &RuleContext<'_>) -> Vec<Finding>;
}

/// The fixed-precedence rule registry.
pub fn default_rules() -> Vec<Box<dyn DiffRule>> {
    vec![
        Box::new(keyed::KeyedDiffRule),
        Box::new(strict_text::StrictTextRule),
        Box::new(reverse::ReverseComparisonRule),
        Box::new(missing_element::MissingElementRule),
        Box::new(visibility::VisibilityRule),
        Box::new(policy::PolicyRule),
        Box::new(structure::StructureRule),
    ]
}

/// Run the full pipeline: guardrail first, then every rule in precedence
/// order, concatenating findings in that order.
pub fn run_pipeline(documents: &[CanonicalDocument], items: &[RequirementItem]) -> Vec<Finding> {
    if let Some(guardrail) = guardrail_finding(items) {
        return vec![guardrail];
    }

    let ctx = RuleContext::build(documents, items);
    let mut findings = Vec::new();
    for rule in default_rules() {
        let produced = rule.apply(&ctx);
        debug!(rule = rule.name(), count = produced.len(), "rule applied");
        findings.extend(produced);
    }
    findings
}

/// Fewer than 5 TEXT items, none of them table-sourced, means extraction did
/// not really work — report that instead of running rules over noise.
fn guardrail_finding(items: &[RequirementItem]) -> Option<Finding> {
    let text_items = items
        .iter()
        .filter(|i| i.kind == RequirementKind::Text)
        .count();
    let any_table_sourced = items.iter().any(|i| i.provenance.table_sourced);
    if text_items >= 5 || any_table_sourced {
        return None;
    }

    let mut finding = Finding::new(
        Severity::Critical,
        category::EXTRACTION,
        format!(
            "Spec extraction produced only {text_items} text requirement(s) and no table-sourced \
             items — the document likely failed to parse; findings would be meaningless."
        ),
    );
    finding.id = GUARDRAIL_FINDING_ID.to_string();
    finding.decision = Some(Decision {
        rule: "guardrail".to_string(),
        reason: reason::EXTRACTION_INSUFFICIENT.to_string(),
        explanation: Some("pipeline aborted before any rule ran".to_string()),
    });
    finding
        .evidence
        .insert("textItemCount".to_string(), serde_json::Value::from(text_items));
    Some(finding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Platform;

    #[test]
    fn test_guardrail_triggers_on_sparse_extraction() {
        let items = vec![
            RequirementItem::text_item("i1", "확인"),
            RequirementItem::text_item("i2", "취소"),
        ];
        let docs = vec![CanonicalDocument::empty(Platform::Design, "d")];
        let findings = run_pipeline(&docs, &items);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].id, GUARDRAIL_FINDING_ID);
        assert_eq!(findings[0].severity, Severity::Critical);
    }

    #[test]
    fn test_guardrail_passes_with_table_sourced_items() {
        let mut item = RequirementItem::text_item("i1", "확인");
        item.provenance.table_sourced = true;
        let docs = vec![CanonicalDocument::empty(Platform::Design, "d")];
        let findings = run_pipeline(&docs, &[item]);
        assert!(findings.iter().all(|f| f.id != GUARDRAIL_FINDING_ID));
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let items: Vec<RequirementItem> = (0..6)
            .map(|i| RequirementItem::text_item(format!("i{i}"), format!("문구 {i}")))
            .collect();
        let docs = vec![CanonicalDocument::empty(Platform::Design, "d")];
        let a = run_pipeline(&docs, &items);
        let b = run_pipeline(&docs, &items);
        let summarize = |fs: &[Finding]| -> Vec<(String, Severity, Option<String>)> {
            fs.iter()
                .map(|f| (f.category.clone(), f.severity, f.requirement_id.clone()))
                .collect()
        };
        assert_eq!(summarize(&a), summarize(&b));
    }
}
