//! Reverse-comparison rule — design text the spec never mentions.
//!
//! Looks at visible, unkeyed TEXT nodes in the design-tool document and asks
//! the opposite question from the strict-text rule: does the spec say
//! anything about this? Unmentioned text passes through noise classifiers so
//! annotations, literals, and comparison labels report softly (INFO) while
//! real product text missing from the spec reports at MINOR, carrying the
//! top-3 closest requirements and a recommended remediation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use super::{category, reason, DiffRule, RuleContext};
use crate::matching::similarity;
use crate::model::{
    Decision, DiffType, Finding, Platform, RecommendedAction, RequirementItem, Severity,
};

pub struct ReverseComparisonRule;

const RULE_NAME: &str = "reverse_comparison";

// ─── Noise classifiers ────────────────────────────────────────────────────────

/// What kind of non-product text an unmentioned design node holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoiseClass {
    Annotation,
    Content,
    Literal,
    Stopword,
    ComparisonLabel,
    Resolution,
}

impl NoiseClass {
    fn as_str(&self) -> &'static str {
        match self {
            NoiseClass::Annotation => "annotation",
            NoiseClass::Content => "content",
            NoiseClass::Literal => "literal",
            NoiseClass::Stopword => "stopword",
            NoiseClass::ComparisonLabel => "comparison_label",
            NoiseClass::Resolution => "resolution",
        }
    }
}

const ANNOTATION_WORDS: &[&str] = &[
    "tooltip", "말풍선", "주석", "annotation", "가이드", "guide", "hint", "참고", "메모",
    "note:", "설명:",
];

const COMPARISON_LABELS: &[&str] = &[
    "as-is", "to-be", "before", "after", "변경 전", "변경 후", "개선 전", "개선 후",
];

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "등", "및", "또는", "그리고",
];

static RE_BOOL_HEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(true|false|null|#?[0-9a-f]{6}|#?[0-9a-f]{8}|0x[0-9a-f]+)$")
        .expect("bool/hex regex")
});

static RE_AUTHOR_HASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[@#]\S+$|작성자|@[A-Za-z0-9_]+$").expect("author/hashtag regex"));

fn classify_noise(text: &str) -> Option<NoiseClass> {
    let lower = text.trim().to_lowercase();
    if crate::normalize::design::is_authoring_noise(&lower) {
        return Some(NoiseClass::Resolution);
    }
    if ANNOTATION_WORDS.iter().any(|w| lower.contains(w)) {
        return Some(NoiseClass::Annotation);
    }
    if COMPARISON_LABELS.iter().any(|w| lower == *w || lower.starts_with(&format!("{w} "))) {
        return Some(NoiseClass::ComparisonLabel);
    }
    if RE_BOOL_HEX.is_match(&lower) {
        return Some(NoiseClass::Literal);
    }
    if RE_AUTHOR_HASHTAG.is_match(text.trim()) {
        return Some(NoiseClass::Content);
    }
    if lower.split_whitespace().count() == 1 && STOPWORDS.contains(&lower.as_str()) {
        return Some(NoiseClass::Stopword);
    }
    None
}

// ─── Mention tests ────────────────────────────────────────────────────────────

/// Substring mention in either direction against any requirement's text.
fn mentioned_in_items(text: &str, items: &[RequirementItem]) -> bool {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return true;
    }
    items.iter().any(|item| {
        item.text
            .as_deref()
            .map(|t| {
                let t = t.trim().to_lowercase();
                !t.is_empty() && (t.contains(&lower) || lower.contains(&t))
            })
            .unwrap_or(false)
    })
}

/// Partial keyword match against the full spec text: at least half the node's
/// tokens appear somewhere in the spec surface.
fn keyword_matchable(text: &str, spec_text: &str) -> bool {
    let toks = similarity::tokens(text);
    if toks.is_empty() {
        return true;
    }
    let hits = toks.iter().filter(|t| spec_text.contains(t.as_str())).count();
    hits * 2 >= toks.len()
}

impl DiffRule for ReverseComparisonRule {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn apply(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let Some(design) = ctx.document(Platform::Design) else {
            return Vec::new();
        };

        let mut findings = Vec::new();
        for node in &design.nodes {
            if !node.visible || node.selector_key.is_some() {
                continue;
            }
            if node.role.as_deref().map(|r| r != "text").unwrap_or(false) {
                continue;
            }
            let Some(text) = node.text.as_deref().filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            if mentioned_in_items(text, ctx.items) || keyword_matchable(text, &ctx.spec_text) {
                continue;
            }

            // Top-3 closest requirements, best first.
            let mut scored: Vec<(f64, &RequirementItem)> = ctx
                .items
                .iter()
                .filter(|i| i.text.is_some())
                .map(|i| (similarity::token_set_similarity(text, i.text.as_deref().unwrap_or_default()), i))
                .collect();
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
            let top: Vec<Value> = scored
                .iter()
                .take(3)
                .map(|(sim, item)| {
                    json!({
                        "requirementId": item.id,
                        "text": item.text,
                        "similarity": sim,
                    })
                })
                .collect();
            let best_similarity = scored.first().map(|(s, _)| *s).unwrap_or(0.0);

            let noise = classify_noise(text);
            let severity = if noise.is_some() { Severity::Info } else { Severity::Minor };
            let action = if best_similarity > 0.7 {
                RecommendedAction::DesignUpdate
            } else if best_similarity < 0.3 {
                RecommendedAction::IgnoreNoise
            } else {
                RecommendedAction::SpecUpdate
            };

            let mut f = Finding::new(
                severity,
                category::UNMAPPED_TEXT,
                format!("Design text '{text}' is not mentioned anywhere in the spec"),
            );
            f.diff_type = Some(DiffType::Unmapped);
            f.recommended_action = Some(action);
            f.decision = Some(Decision {
                rule: RULE_NAME.to_string(),
                reason: reason::NOT_IN_SPEC.to_string(),
                explanation: noise.map(|n| format!("classified as {} text", n.as_str())),
            });
            f.evidence.insert("nodeId".to_string(), Value::from(node.id.as_str()));
            f.evidence.insert("nodeText".to_string(), Value::from(text));
            f.evidence.insert("topCandidates".to_string(), Value::Array(top));
            f.evidence
                .insert("bestSimilarity".to_string(), Value::from(best_similarity));
            findings.push(f);
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalDocument, CanonicalNode};

    fn design_doc(texts: &[&str]) -> CanonicalDocument {
        let nodes = texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let mut n = CanonicalNode::new(Platform::Design, format!("n{i}"));
                n.role = Some("text".to_string());
                n.text = Some(t.to_string());
                n
            })
            .collect();
        CanonicalDocument::new(Platform::Design, "d", nodes)
    }

    #[test]
    fn test_mentioned_text_is_silent() {
        let docs = vec![design_doc(&["확인"])];
        let items = vec![RequirementItem::text_item("i1", "확인 버튼")];
        let ctx = RuleContext::build(&docs, &items);
        assert!(ReverseComparisonRule.apply(&ctx).is_empty());
    }

    #[test]
    fn test_unmentioned_product_text_is_minor() {
        let docs = vec![design_doc(&["비밀번호 재설정 안내문"])];
        let items = vec![RequirementItem::text_item("i1", "확인")];
        let ctx = RuleContext::build(&docs, &items);
        let findings = ReverseComparisonRule.apply(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Minor);
        assert_eq!(findings[0].diff_type, Some(DiffType::Unmapped));
        assert_eq!(
            findings[0].recommended_action,
            Some(RecommendedAction::IgnoreNoise)
        );
    }

    #[test]
    fn test_annotation_text_is_info() {
        let docs = vec![design_doc(&["tooltip: 사용 안내"])];
        let items = vec![RequirementItem::text_item("i1", "확인")];
        let ctx = RuleContext::build(&docs, &items);
        let findings = ReverseComparisonRule.apply(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[test]
    fn test_keyed_nodes_are_skipped() {
        let mut doc = design_doc(&["키 붙은 텍스트"]);
        doc.nodes[0].selector_key = Some("some.key".to_string());
        let docs = vec![doc];
        let items = vec![RequirementItem::text_item("i1", "확인")];
        let ctx = RuleContext::build(&docs, &items);
        assert!(ReverseComparisonRule.apply(&ctx).is_empty());
    }

    #[test]
    fn test_top_candidates_in_evidence() {
        let docs = vec![design_doc(&["회원가입 완료 축하 메시지"])];
        let items = vec![
            RequirementItem::text_item("i1", "확인"),
            RequirementItem::text_item("i2", "취소"),
        ];
        let ctx = RuleContext::build(&docs, &items);
        let findings = ReverseComparisonRule.apply(&ctx);
        let top = findings[0].evidence.get("topCandidates").unwrap();
        assert_eq!(top.as_array().unwrap().len(), 2);
    }
}
