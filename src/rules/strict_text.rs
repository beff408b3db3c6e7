//! Strict-text rule — the fallback comparison for unkeyed TEXT requirements.
//!
//! Each item is pushed through the fixed-precedence matcher. A miss retries
//! with generic UI-type vocabulary stripped ("확인 버튼" should still find a
//! node that only says "확인"). Definitive misses are reason-coded: either
//! the text is confirmed missing from every capture, or it is present in the
//! raw capture text and normalization lost it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{category, reason, DiffRule, RuleContext};
use crate::matching::NodeMatch;
use crate::model::{Decision, DiffType, Finding, RequirementItem, RequirementKind, Severity};

pub struct StrictTextRule;

const RULE_NAME: &str = "strict_text";

/// Generic UI-type words that add no identity to a display phrase.
static RE_GENERIC_UI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(button|label|checkbox|link|icon|tab|menu|toggle|input|field|text)\b|버튼|라벨|레이블|체크박스|링크|아이콘|탭|메뉴|토글|입력|영역",
    )
    .expect("generic ui regex")
});

/// Expected text with generic UI vocabulary removed.
fn strip_generic_ui(text: &str) -> String {
    let stripped = RE_GENERIC_UI.replace_all(text, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl DiffRule for StrictTextRule {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn apply(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for item in ctx.items {
            // Keyed items belong to the keyed rule, permanently.
            if item.selector_key.is_some() || item.kind != RequirementKind::Text {
                continue;
            }
            let Some(expected) = item.text.as_deref() else {
                continue;
            };

            let mut matched = ctx.index.find_match(item);
            if matched.is_none() {
                let retry_text = strip_generic_ui(expected);
                if !retry_text.is_empty() && retry_text != expected {
                    matched = ctx
                        .index
                        .by_exact_text(&retry_text)
                        .map(|node| NodeMatch {
                            node,
                            match_type: crate::matching::MatchType::ExactText,
                            similarity: 1.0,
                        })
                        .or_else(|| ctx.index.best_similarity_match(&retry_text));
                }
            }

            match matched {
                Some(m) if m.similarity >= 0.9 => {}
                Some(m) => {
                    let severity = if m.similarity < 0.7 { Severity::Major } else { Severity::Minor };
                    let actual = m.node.text.as_deref().or(m.node.name.as_deref()).unwrap_or_default();
                    let mut f = Finding::new(
                        severity,
                        category::TEXT_MISMATCH,
                        format!("Spec text '{expected}' only loosely matches capture text '{actual}'"),
                    );
                    f.requirement_id = Some(item.id.clone());
                    f.diff_type = Some(DiffType::Mismatch);
                    f.decision = Some(Decision {
                        rule: RULE_NAME.to_string(),
                        reason: reason::LOW_SIMILARITY.to_string(),
                        explanation: Some(format!("matched via {}", m.match_type.as_str())),
                    });
                    f.evidence.insert("expected".to_string(), Value::from(expected));
                    f.evidence.insert("actual".to_string(), Value::from(actual));
                    f.evidence.insert("similarity".to_string(), Value::from(m.similarity));
                    f.evidence
                        .insert("nodeId".to_string(), Value::from(m.node.id.as_str()));
                    findings.push(f);
                }
                None => {
                    // Distinguish a true absence from a normalization gap via
                    // a full-text search over the raw capture surface.
                    let in_capture_text = ctx.capture_text.contains(&expected.to_lowercase());
                    let code = if in_capture_text {
                        reason::NORMALIZATION_GAP
                    } else {
                        reason::CONFIRMED_MISSING
                    };
                    let mut f = Finding::new(
                        Severity::Major,
                        category::TEXT_MISMATCH,
                        format!("Spec text '{expected}' was not found on any captured surface"),
                    );
                    f.requirement_id = Some(item.id.clone());
                    f.diff_type = Some(DiffType::Missing);
                    f.decision = Some(Decision {
                        rule: RULE_NAME.to_string(),
                        reason: code.to_string(),
                        explanation: None,
                    });
                    f.evidence.insert("expected".to_string(), Value::from(expected));
                    findings.push(f);
                }
            }
        }
        findings
    }
}
