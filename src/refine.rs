//! Refinement port — an optional external re-scorer/merger of findings.
//!
//! The pipeline output is complete without refinement; a refiner may merge or
//! re-rank findings but must never silently drop them. When no external
//! scorer is configured, `MergeRefiner` stands in: it merges findings that
//! share more than 70% description-token overlap plus identical category and
//! severity. Refiner failure is recovered by falling back to the unrefined
//! findings — never propagated as fatal.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::matching::similarity;
use crate::model::{CanonicalDocument, Finding, RequirementItem};

/// External collaborator contract. One awaited call per pipeline run.
#[async_trait]
pub trait FindingRefiner: Send + Sync {
    async fn refine(
        &self,
        findings: Vec<Finding>,
        documents: &[CanonicalDocument],
        items: &[RequirementItem],
    ) -> Result<Vec<Finding>>;
}

/// Merge-only default refiner.
pub struct MergeRefiner;

const MERGE_THRESHOLD: f64 = 0.7;

#[async_trait]
impl FindingRefiner for MergeRefiner {
    async fn refine(
        &self,
        findings: Vec<Finding>,
        _documents: &[CanonicalDocument],
        _items: &[RequirementItem],
    ) -> Result<Vec<Finding>> {
        Ok(merge_similar(findings))
    }
}

/// Merge findings with near-duplicate descriptions. Merged findings are
/// recorded in the survivor's evidence, so nothing disappears silently.
pub fn merge_similar(findings: Vec<Finding>) -> Vec<Finding> {
    let mut kept: Vec<Finding> = Vec::new();
    for finding in findings {
        let merge_target = kept.iter_mut().find(|k| {
            k.category == finding.category
                && k.severity == finding.severity
                && similarity::token_set_similarity(&k.description, &finding.description)
                    > MERGE_THRESHOLD
        });
        match merge_target {
            Some(survivor) => {
                let merged = survivor
                    .evidence
                    .entry("mergedFindingIds".to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(ids) = merged {
                    ids.push(Value::from(finding.id.as_str()));
                }
            }
            None => kept.push(finding),
        }
    }
    kept
}

/// Await the configured refiner, falling back to the unrefined findings on
/// any failure. The caller sees fewer/softer findings, never an error.
pub async fn apply_refiner(
    refiner: Option<&dyn FindingRefiner>,
    findings: Vec<Finding>,
    documents: &[CanonicalDocument],
    items: &[RequirementItem],
) -> Vec<Finding> {
    let Some(refiner) = refiner else {
        return findings;
    };
    let fallback = findings.clone();
    match refiner.refine(findings, documents, items).await {
        Ok(refined) => refined,
        Err(e) => {
            warn!(err = %e, "finding refiner failed — falling back to unrefined findings");
            fallback
        }
    }
}
