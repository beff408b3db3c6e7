//! Policy rule — consent, restriction, and confirmation text that must exist
//! somewhere on the captured surfaces.
//!
//! Applies to POLICY-kind items, and to any item whose text carries policy
//! vocabulary (adult/login/restriction/consent/confirm). Verification is a
//! substring check over node text and name; absence reports at MINOR.

use serde_json::Value;

use super::{category, reason, DiffRule, RuleContext};
use crate::model::{Decision, DiffType, Finding, RequirementKind, Severity};

pub struct PolicyRule;

const RULE_NAME: &str = "policy";

const POLICY_KEYWORDS: &[&str] = &[
    "adult", "성인", "login", "로그인", "restriction", "제한", "consent", "동의", "confirm",
    "확인",
];

fn is_policy_item(item: &crate::model::RequirementItem) -> bool {
    if item.kind == RequirementKind::Policy {
        return true;
    }
    item.text
        .as_deref()
        .map(|t| {
            let lower = t.to_lowercase();
            POLICY_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .unwrap_or(false)
}

impl DiffRule for PolicyRule {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn apply(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for item in ctx.items {
            if item.selector_key.is_some() || !is_policy_item(item) {
                continue;
            }
            let Some(text) = item.text.as_deref().filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            let needle = text.trim().to_lowercase();
            let present = ctx.index.nodes().iter().any(|node| {
                [node.text.as_deref(), node.name.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
            });
            if present {
                continue;
            }

            let mut f = Finding::new(
                Severity::Minor,
                category::POLICY,
                format!("Policy text '{text}' was not found on any captured surface"),
            );
            f.requirement_id = Some(item.id.clone());
            f.diff_type = Some(DiffType::Missing);
            f.decision = Some(Decision {
                rule: RULE_NAME.to_string(),
                reason: reason::POLICY_ABSENT.to_string(),
                explanation: None,
            });
            f.evidence.insert("expected".to_string(), Value::from(text));
            findings.push(f);
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalDocument, CanonicalNode, Platform, RequirementItem};

    fn doc(text: &str) -> CanonicalDocument {
        let mut n = CanonicalNode::new(Platform::Web, "n1");
        n.text = Some(text.to_string());
        CanonicalDocument::new(Platform::Web, "d", vec![n])
    }

    #[test]
    fn test_absent_policy_text_is_minor() {
        let mut item = RequirementItem::text_item("i1", "만 19세 이상 성인 인증");
        item.kind = RequirementKind::Policy;
        let docs = vec![doc("홈 화면")];
        let items = [item];
        let ctx = RuleContext::build(&docs, &items);
        let findings = PolicyRule.apply(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Minor);
        assert_eq!(findings[0].category, category::POLICY);
    }

    #[test]
    fn test_keyword_bearing_text_item_is_checked() {
        // Not POLICY-kind, but carries policy vocabulary.
        let item = RequirementItem::text_item("i1", "수집 이용 동의 문구");
        let docs = vec![doc("홈 화면")];
        let items = [item];
        let ctx = RuleContext::build(&docs, &items);
        assert_eq!(PolicyRule.apply(&ctx).len(), 1);
    }

    #[test]
    fn test_present_policy_text_is_silent() {
        let mut item = RequirementItem::text_item("i1", "성인 인증");
        item.kind = RequirementKind::Policy;
        let docs = vec![doc("이 콘텐츠는 성인 인증 후 이용할 수 있습니다")];
        let items = [item];
        let ctx = RuleContext::build(&docs, &items);
        assert!(PolicyRule.apply(&ctx).is_empty());
    }

    #[test]
    fn test_plain_text_item_without_keywords_is_ignored() {
        let item = RequirementItem::text_item("i1", "환영합니다");
        let docs = vec![doc("홈 화면")];
        let items = [item];
        let ctx = RuleContext::build(&docs, &items);
        assert!(PolicyRule.apply(&ctx).is_empty());
    }
}
