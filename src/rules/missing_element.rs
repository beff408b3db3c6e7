//! Missing-element rule — STATE requirements that demand visibility and have
//! no trace on any captured surface.
//!
//! Reports CRITICAL: a "must be shown" element that neither matches
//! structurally nor appears as a substring of any node's role, name, or text
//! is the clearest possible release blocker this engine can detect.

use serde_json::Value;

use super::{category, reason, DiffRule, RuleContext};
use crate::model::{
    Decision, DiffType, Finding, RequirementKind, Severity, VisibilityRequirement,
};

pub struct MissingElementRule;

const RULE_NAME: &str = "missing_element";

impl DiffRule for MissingElementRule {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn apply(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for item in ctx.items {
            if item.kind != RequirementKind::State
                || item.visibility != Some(VisibilityRequirement::Show)
            {
                continue;
            }
            if ctx.index.find_match(item).is_some() {
                continue;
            }
            let Some(subject) = item.text.as_deref().filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            if substring_hit(ctx, subject) {
                continue;
            }

            let mut f = Finding::new(
                Severity::Critical,
                category::MISSING_ELEMENT,
                format!("Required element '{subject}' must be shown but was not found on any surface"),
            );
            f.requirement_id = Some(item.id.clone());
            f.diff_type = Some(DiffType::Missing);
            f.decision = Some(Decision {
                rule: RULE_NAME.to_string(),
                reason: reason::CONFIRMED_MISSING.to_string(),
                explanation: Some("no structural match and no substring hit on role/name/text".to_string()),
            });
            f.evidence.insert("expected".to_string(), Value::from(subject));
            findings.push(f);
        }
        findings
    }
}

/// Substring search over every capture node's role, name, and text.
fn substring_hit(ctx: &RuleContext<'_>, subject: &str) -> bool {
    let needle = subject.trim().to_lowercase();
    ctx.index.nodes().iter().any(|node| {
        [node.role.as_deref(), node.name.as_deref(), node.text.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    })
}
