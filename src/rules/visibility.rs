//! Visibility rule — explicit show/hide requirements against the matched
//! node's visible flag.
//!
//! Should-show-but-hidden is MAJOR; should-hide-but-shown is MINOR. When no
//! node matches at all the same severities apply with an "unevaluated"
//! description, so the gap stays visible without overstating certainty.

use serde_json::Value;

use super::{category, reason, DiffRule, RuleContext};
use crate::model::{
    Decision, DiffType, Finding, RequirementKind, Severity, VisibilityRequirement,
};

pub struct VisibilityRule;

const RULE_NAME: &str = "visibility";

fn severity_for(requirement: VisibilityRequirement) -> Severity {
    match requirement {
        VisibilityRequirement::Show => Severity::Major,
        VisibilityRequirement::Hide => Severity::Minor,
    }
}

impl DiffRule for VisibilityRule {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn apply(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for item in ctx.items {
            if item.kind != RequirementKind::State {
                continue;
            }
            let Some(required) = item.visibility else {
                continue;
            };
            let subject = item.text.as_deref().unwrap_or("(unnamed element)");

            match ctx.index.find_match(item) {
                Some(m) => {
                    let should_show = required == VisibilityRequirement::Show;
                    if m.node.visible == should_show {
                        continue;
                    }
                    let mut f = Finding::new(
                        severity_for(required),
                        category::VISIBILITY,
                        format!(
                            "'{subject}' should be {} but the matched node is {}",
                            if should_show { "visible" } else { "hidden" },
                            if m.node.visible { "visible" } else { "hidden" },
                        ),
                    );
                    f.requirement_id = Some(item.id.clone());
                    f.diff_type = Some(DiffType::Mismatch);
                    f.decision = Some(Decision {
                        rule: RULE_NAME.to_string(),
                        reason: reason::VISIBILITY_MISMATCH.to_string(),
                        explanation: Some(format!("matched via {}", m.match_type.as_str())),
                    });
                    f.evidence
                        .insert("nodeId".to_string(), Value::from(m.node.id.as_str()));
                    f.evidence
                        .insert("nodeVisible".to_string(), Value::from(m.node.visible));
                    findings.push(f);
                }
                None => {
                    let mut f = Finding::new(
                        severity_for(required),
                        category::VISIBILITY,
                        format!(
                            "Visibility of '{subject}' could not be evaluated — no matching node"
                        ),
                    );
                    f.requirement_id = Some(item.id.clone());
                    f.diff_type = Some(DiffType::Unmapped);
                    f.decision = Some(Decision {
                        rule: RULE_NAME.to_string(),
                        reason: reason::UNEVALUATED.to_string(),
                        explanation: None,
                    });
                    findings.push(f);
                }
            }
        }
        findings
    }
}
