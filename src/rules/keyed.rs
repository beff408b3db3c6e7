//! Keyed-diff rule — highest precedence.
//!
//! Requirement items carrying a selector-key are matched 1:1 by that key,
//! independently against the design-tool and DOM documents. Keyed items are
//! permanently excluded from every later fuzzy-text rule, so each drift is
//! reported exactly once.

use std::collections::HashSet;

use serde_json::Value;

use super::{category, reason, DiffRule, RuleContext};
use crate::matching::{normalize_lookup_key, similarity};
use crate::model::{Decision, DiffType, Finding, Platform, Severity};

pub struct KeyedDiffRule;

const RULE_NAME: &str = "keyed_diff";

impl DiffRule for KeyedDiffRule {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn apply(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut claimed_keys: HashSet<String> = HashSet::new();

        for item in ctx.items.iter().filter(|i| i.selector_key.is_some()) {
            let key = item.selector_key.as_deref().unwrap_or_default();
            claimed_keys.insert(key.to_string());

            for platform in [Platform::Design, Platform::Web] {
                let Some(doc) = ctx.document(platform) else {
                    continue;
                };
                let node = doc
                    .nodes
                    .iter()
                    .find(|n| n.selector_key.as_deref() == Some(key));

                match node {
                    None => {
                        let mut f = Finding::new(
                            Severity::Major,
                            category::MISSING_ELEMENT,
                            format!(
                                "No {} node carries key '{key}' required by the spec",
                                platform.as_str()
                            ),
                        );
                        f.requirement_id = Some(item.id.clone());
                        f.selector_key = Some(key.to_string());
                        f.diff_type = Some(DiffType::Missing);
                        f.decision = Some(Decision {
                            rule: RULE_NAME.to_string(),
                            reason: reason::CONFIRMED_MISSING.to_string(),
                            explanation: Some(format!(
                                "key lookup over the {} document found no node",
                                platform.as_str()
                            )),
                        });
                        f.evidence
                            .insert("platform".to_string(), Value::from(platform.as_str()));
                        findings.push(f);
                    }
                    Some(node) => {
                        let expected = item.text.as_deref().unwrap_or_default();
                        let actual = node.text.as_deref().unwrap_or_default();
                        if normalize_lookup_key(expected) == normalize_lookup_key(actual) {
                            continue;
                        }
                        let sim = similarity::token_set_similarity(expected, actual);
                        let severity = if sim < 0.7 { Severity::Major } else { Severity::Minor };
                        let mut f = Finding::new(
                            severity,
                            category::TEXT_MISMATCH,
                            format!(
                                "Text under key '{key}' differs on {}: spec '{expected}' vs capture '{actual}'",
                                platform.as_str()
                            ),
                        );
                        f.requirement_id = Some(item.id.clone());
                        f.selector_key = Some(key.to_string());
                        f.diff_type = Some(DiffType::Changed);
                        f.decision = Some(Decision {
                            rule: RULE_NAME.to_string(),
                            reason: reason::KEY_TEXT_DIFFERS.to_string(),
                            explanation: None,
                        });
                        f.evidence.insert("expected".to_string(), Value::from(expected));
                        f.evidence.insert("actual".to_string(), Value::from(actual));
                        f.evidence.insert("similarity".to_string(), Value::from(sim));
                        f.evidence.insert("nodeId".to_string(), Value::from(node.id.as_str()));
                        findings.push(f);
                    }
                }
            }
        }

        // Design-side keys the spec never claims are flagged as extras.
        if let Some(design) = ctx.document(Platform::Design) {
            for node in &design.nodes {
                let Some(key) = node.selector_key.as_deref() else {
                    continue;
                };
                if claimed_keys.contains(key) {
                    continue;
                }
                let mut f = Finding::new(
                    Severity::Minor,
                    category::EXTRA_ELEMENT,
                    format!("Design node '{}' carries key '{key}' with no matching requirement", node.id),
                );
                f.selector_key = Some(key.to_string());
                f.diff_type = Some(DiffType::Extra);
                f.decision = Some(Decision {
                    rule: RULE_NAME.to_string(),
                    reason: reason::KEY_UNCLAIMED.to_string(),
                    explanation: None,
                });
                if let Some(text) = node.text.as_deref() {
                    f.evidence.insert("nodeText".to_string(), Value::from(text));
                }
                findings.push(f);
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalDocument, CanonicalNode, RequirementItem};

    fn design_doc(nodes: Vec<CanonicalNode>) -> CanonicalDocument {
        CanonicalDocument::new(Platform::Design, "d", nodes)
    }

    fn keyed_node(id: &str, key: &str, text: &str) -> CanonicalNode {
        let mut n = CanonicalNode::new(Platform::Design, id);
        n.text = Some(text.to_string());
        n.selector_key = Some(key.to_string());
        n
    }

    fn keyed_item(id: &str, key: &str, text: &str) -> RequirementItem {
        let mut item = RequirementItem::text_item(id, text);
        item.selector_key = Some(key.to_string());
        item
    }

    #[test]
    fn test_missing_key_reports_major_missing() {
        let docs = vec![design_doc(vec![])];
        let items = vec![keyed_item("i1", "ok.button", "확인")];
        let ctx = RuleContext::build(&docs, &items);
        let findings = KeyedDiffRule.apply(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Major);
        assert_eq!(findings[0].category, category::MISSING_ELEMENT);
        assert_eq!(findings[0].diff_type, Some(DiffType::Missing));
        assert_eq!(
            findings[0].decision.as_ref().unwrap().reason,
            reason::CONFIRMED_MISSING
        );
    }

    #[test]
    fn test_matching_key_and_text_is_silent() {
        let docs = vec![design_doc(vec![keyed_node("n1", "ok.button", "확인")])];
        let items = vec![keyed_item("i1", "ok.button", "확인")];
        let ctx = RuleContext::build(&docs, &items);
        assert!(KeyedDiffRule.apply(&ctx).is_empty());
    }

    #[test]
    fn test_text_difference_severity_scales_with_similarity() {
        // Disjoint text: similarity 0 → MAJOR.
        let docs = vec![design_doc(vec![keyed_node("n1", "ok.button", "Login")])];
        let items = vec![keyed_item("i1", "ok.button", "확인")];
        let ctx = RuleContext::build(&docs, &items);
        let findings = KeyedDiffRule.apply(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Major);
        assert_eq!(findings[0].diff_type, Some(DiffType::Changed));

        // High overlap → MINOR.
        let docs = vec![design_doc(vec![keyed_node(
            "n1",
            "ok.button",
            "확인 버튼 영역 표시",
        )])];
        let items = vec![keyed_item("i1", "ok.button", "확인 버튼 영역")];
        let ctx = RuleContext::build(&docs, &items);
        let findings = KeyedDiffRule.apply(&ctx);
        assert_eq!(findings[0].severity, Severity::Minor);
    }

    #[test]
    fn test_unclaimed_design_key_is_extra() {
        let docs = vec![design_doc(vec![keyed_node("n1", "stray.label", "임시")])];
        let items: Vec<RequirementItem> = vec![];
        let ctx = RuleContext::build(&docs, &items);
        let findings = KeyedDiffRule.apply(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Minor);
        assert_eq!(findings[0].diff_type, Some(DiffType::Extra));
    }
}
