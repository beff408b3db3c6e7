//! Structure rule — purely diagnostic capture health checks.
//!
//! Flags documents with zero nodes (the normalizer's failure value) and
//! documents with no recognizable root node, both at INFO. These findings
//! explain *why* other rules stayed quiet; they never block anything.

use serde_json::Value;

use super::{category, reason, DiffRule, RuleContext};
use crate::model::{CanonicalDocument, Decision, Finding, Severity};

pub struct StructureRule;

const RULE_NAME: &str = "structure";

/// A root is any node whose path sits at the top of the hierarchy.
fn has_recognizable_root(doc: &CanonicalDocument) -> bool {
    doc.nodes.iter().any(|node| {
        match node.selector.as_deref() {
            Some(path) => {
                let trimmed = path.trim();
                trimmed == "/"
                    || trimmed == "root"
                    || trimmed.starts_with("line:")
                    || trimmed.matches("/[").count() <= 1
            }
            // Nodes without any path (label lists) count as top-level.
            None => true,
        }
    })
}

impl DiffRule for StructureRule {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn apply(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for doc in ctx.documents.iter().filter(|d| d.platform.is_capture()) {
            if doc.is_empty() {
                let mut f = Finding::new(
                    Severity::Info,
                    category::STRUCTURE,
                    format!(
                        "{} capture '{}' normalized to zero nodes — payload was empty or unparsable",
                        doc.platform.as_str(),
                        doc.source_id
                    ),
                );
                f.decision = Some(Decision {
                    rule: RULE_NAME.to_string(),
                    reason: reason::EMPTY_DOCUMENT.to_string(),
                    explanation: None,
                });
                f.evidence
                    .insert("platform".to_string(), Value::from(doc.platform.as_str()));
                findings.push(f);
                continue;
            }
            if !has_recognizable_root(doc) {
                let mut f = Finding::new(
                    Severity::Info,
                    category::STRUCTURE,
                    format!(
                        "{} capture '{}' has no recognizable root node",
                        doc.platform.as_str(),
                        doc.source_id
                    ),
                );
                f.decision = Some(Decision {
                    rule: RULE_NAME.to_string(),
                    reason: reason::NO_ROOT.to_string(),
                    explanation: None,
                });
                findings.push(f);
            }
        }
        findings
    }
}
