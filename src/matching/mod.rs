//! Node index and matching strategy.
//!
//! Four lookup maps (selector, role, path, text — all keyed by trimmed,
//! lowercased, whitespace-collapsed strings) are built over the non-spec
//! canonical documents. `find_match` tries structural lookups before any
//! textual guessing; that precedence is deliberate and load-bearing.

pub mod similarity;

use std::collections::HashMap;

use crate::model::{CanonicalDocument, CanonicalNode, RequirementItem};

/// How a node was matched to a requirement, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Selector,
    Role,
    Path,
    ExactText,
    Similarity,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Selector => "selector",
            MatchType::Role => "role",
            MatchType::Path => "path",
            MatchType::ExactText => "exact_text",
            MatchType::Similarity => "similarity",
        }
    }
}

/// A successful match: the node, how it was found, and the text similarity
/// between the requirement and the node (1.0 for structural/exact matches).
#[derive(Debug, Clone, Copy)]
pub struct NodeMatch<'a> {
    pub node: &'a CanonicalNode,
    pub match_type: MatchType,
    pub similarity: f64,
}

/// Lookup key normalization shared by every map.
pub fn normalize_lookup_key(s: &str) -> String {
    s.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Index over the capture documents (everything except the spec platform).
pub struct NodeIndex<'a> {
    by_selector: HashMap<String, Vec<&'a CanonicalNode>>,
    by_role: HashMap<String, Vec<&'a CanonicalNode>>,
    by_path: HashMap<String, Vec<&'a CanonicalNode>>,
    by_text: HashMap<String, Vec<&'a CanonicalNode>>,
    /// All indexed nodes in document order — the similarity-search candidate
    /// pool and the deterministic tie-break order.
    all: Vec<&'a CanonicalNode>,
}

impl<'a> NodeIndex<'a> {
    pub fn build(documents: &'a [CanonicalDocument]) -> Self {
        let mut index = Self {
            by_selector: HashMap::new(),
            by_role: HashMap::new(),
            by_path: HashMap::new(),
            by_text: HashMap::new(),
            all: Vec::new(),
        };
        for doc in documents.iter().filter(|d| d.platform.is_capture()) {
            for node in &doc.nodes {
                if let Some(sel) = node.selector_key.as_deref().or(node.selector.as_deref()) {
                    index
                        .by_selector
                        .entry(normalize_lookup_key(sel))
                        .or_default()
                        .push(node);
                }
                if let Some(role) = node.role.as_deref() {
                    index
                        .by_role
                        .entry(normalize_lookup_key(role))
                        .or_default()
                        .push(node);
                }
                if let Some(path) = node.selector.as_deref() {
                    index
                        .by_path
                        .entry(normalize_lookup_key(path))
                        .or_default()
                        .push(node);
                }
                if let Some(text) = node.text.as_deref() {
                    index
                        .by_text
                        .entry(normalize_lookup_key(text))
                        .or_default()
                        .push(node);
                }
                index.all.push(node);
            }
        }
        index
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn nodes(&self) -> &[&'a CanonicalNode] {
        &self.all
    }

    /// Exact-text lookup, exposed for rules that retry with edited text.
    pub fn by_exact_text(&self, text: &str) -> Option<&'a CanonicalNode> {
        self.by_text
            .get(&normalize_lookup_key(text))
            .and_then(|v| v.first())
            .copied()
    }

    /// Fixed-precedence matcher: selector → role (via the selector string) →
    /// path → exact text → token-set similarity (> 0.5, strictly the best).
    pub fn find_match(&self, item: &RequirementItem) -> Option<NodeMatch<'a>> {
        let selector = item
            .selector_key
            .as_deref()
            .or(item.selector.as_deref())
            .map(normalize_lookup_key);

        if let Some(sel) = &selector {
            if let Some(node) = self.by_selector.get(sel).and_then(|v| v.first()) {
                return Some(NodeMatch { node, match_type: MatchType::Selector, similarity: 1.0 });
            }
            if let Some(node) = self.by_role.get(sel).and_then(|v| v.first()) {
                return Some(NodeMatch { node, match_type: MatchType::Role, similarity: 1.0 });
            }
            if let Some(node) = self.by_path.get(sel).and_then(|v| v.first()) {
                return Some(NodeMatch { node, match_type: MatchType::Path, similarity: 1.0 });
            }
        }

        let text = item.text.as_deref()?;
        if let Some(node) = self.by_exact_text(text) {
            return Some(NodeMatch { node, match_type: MatchType::ExactText, similarity: 1.0 });
        }
        self.best_similarity_match(text)
    }

    /// Best similarity candidate over text and name. Accepted only above 0.5
    /// and only when strictly better than every earlier candidate, so equal
    /// scores resolve to the first node in document order.
    pub fn best_similarity_match(&self, text: &str) -> Option<NodeMatch<'a>> {
        let mut best: Option<NodeMatch<'a>> = None;
        for node in &self.all {
            let candidate_text = node.text.as_deref().or(node.name.as_deref());
            let Some(candidate_text) = candidate_text else {
                continue;
            };
            let sim = similarity::token_set_similarity(text, candidate_text);
            if sim > 0.5 && best.map(|b| sim > b.similarity).unwrap_or(true) {
                best = Some(NodeMatch { node, match_type: MatchType::Similarity, similarity: sim });
            }
        }
        best
    }
}
