//! Drift engine façade — wires normalizers, the requirement extractor, the
//! rule pipeline, and the finding refiner (merge-only unless replaced) into
//! one entry point.
//!
//! `run` takes pre-supplied captures plus the raw spec document and returns a
//! serializable report. Report formatting, persistence, and transport are
//! external collaborators that consume the report unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::extract::{keywords::KeywordConfig, RequirementExtractor};
use crate::model::{CanonicalDocument, Finding, Platform, RequirementItem};
use crate::normalize;
use crate::refine::{self, FindingRefiner};
use crate::rules;

/// Pre-supplied raw captures, one optional payload per surface.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSet {
    pub design: Option<Value>,
    pub web: Option<Value>,
    pub android: Option<Value>,
    pub ios: Option<Value>,
}

/// Per-document summary embedded in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub platform: Platform,
    pub source_id: String,
    pub node_count: usize,
}

/// Complete result of one drift run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub documents: Vec<DocumentSummary>,
    pub items: Vec<RequirementItem>,
    pub findings: Vec<Finding>,
    /// Finding count per severity string ("critical", "major", …).
    pub severity_counts: HashMap<String, usize>,
}

/// The engine. Construction is cheap; each `run` is independent and shares
/// no state with any other run.
pub struct DriftEngine {
    extractor: RequirementExtractor,
    refiner: Box<dyn FindingRefiner>,
}

impl Default for DriftEngine {
    fn default() -> Self {
        Self::new(KeywordConfig::default())
    }
}

impl DriftEngine {
    pub fn new(config: KeywordConfig) -> Self {
        Self {
            extractor: RequirementExtractor::new(config),
            refiner: Box::new(refine::MergeRefiner),
        }
    }

    /// Replace the merge-only default with an external refiner (an LLM-backed
    /// scorer, typically).
    pub fn with_refiner(mut self, refiner: Box<dyn FindingRefiner>) -> Self {
        self.refiner = refiner;
        self
    }

    /// Run the full drift detection pass.
    pub async fn run(&self, captures: &CaptureSet, raw_spec: &str) -> DriftReport {
        let mut documents: Vec<CanonicalDocument> = Vec::new();
        if let Some(raw) = &captures.design {
            documents.push(normalize::design::normalize(raw, "design"));
        }
        if let Some(raw) = &captures.web {
            documents.push(normalize::dom::normalize(raw, "web"));
        }
        if let Some(raw) = &captures.android {
            documents.push(normalize::mobile::normalize_android(raw, "android"));
        }
        if let Some(raw) = &captures.ios {
            documents.push(normalize::mobile::normalize_ios(raw, "ios"));
        }
        // The spec's own text surface participates as a document so fuzzy
        // rules can search the full prose, not just the extracted items.
        documents.push(normalize::spec_text::normalize(raw_spec, "spec"));

        let extraction = self.extractor.extract(raw_spec, "spec");
        debug!(
            items = extraction.items.len(),
            latest_date = ?extraction.latest_date,
            "requirement extraction complete"
        );

        let findings = rules::run_pipeline(&documents, &extraction.items);
        let findings = refine::apply_refiner(
            Some(&*self.refiner),
            findings,
            &documents,
            &extraction.items,
        )
        .await;

        let mut severity_counts: HashMap<String, usize> = HashMap::new();
        for finding in &findings {
            *severity_counts
                .entry(finding.severity.as_str().to_string())
                .or_insert(0) += 1;
        }

        DriftReport {
            documents: documents
                .iter()
                .map(|d| DocumentSummary {
                    platform: d.platform,
                    source_id: d.source_id.clone(),
                    node_count: d.nodes.len(),
                })
                .collect(),
            items: extraction.items,
            findings,
            severity_counts,
        }
    }
}
