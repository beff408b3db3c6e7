//! Browser DOM snapshot normalizer.
//!
//! Accepts either a flat node array or a recursive tree (`children`). Copies
//! role/tag, text, and visibility; computes a path (explicit when the capture
//! provides one, synthetic index-based otherwise); surfaces a selector-key
//! directly from `data-qa` / `data-testid` identification attributes.

use serde_json::Value;
use tracing::debug;

use super::{bool_field, collapse_ws, rect_field, str_field};
use crate::model::{CanonicalDocument, CanonicalNode, Platform};
use crate::selector_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DomShape {
    Flat,
    Tree,
    Unknown,
}

fn classify(raw: &Value) -> DomShape {
    match raw {
        Value::Array(_) => DomShape::Flat,
        Value::Object(obj) if obj.contains_key("children") || obj.contains_key("tag") => {
            DomShape::Tree
        }
        _ => DomShape::Unknown,
    }
}

pub fn normalize(raw: &Value, source_id: &str) -> CanonicalDocument {
    let mut nodes = Vec::new();
    match classify(raw) {
        DomShape::Flat => {
            for (i, entry) in raw.as_array().into_iter().flatten().enumerate() {
                if let Some(node) = node_from(entry, source_id, &format!("/[{i}]"), nodes.len()) {
                    nodes.push(node);
                }
            }
        }
        DomShape::Tree => {
            walk(raw, source_id, "", &mut nodes);
        }
        DomShape::Unknown => {
            debug!(source = source_id, "dom payload shape not recognized — empty document");
        }
    }
    CanonicalDocument::new(Platform::Web, source_id, nodes)
}

fn walk(value: &Value, source_id: &str, parent_path: &str, out: &mut Vec<CanonicalNode>) {
    // Synthetic index-based path; the running output length keeps it unique
    // and stable across re-runs of the same capture.
    let synthetic = format!("{parent_path}/[{}]", out.len());
    if let Some(node) = node_from(value, source_id, &synthetic, out.len()) {
        out.push(node);
    }
    for child in value
        .get("children")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        walk(child, source_id, &synthetic, out);
    }
}

fn node_from(entry: &Value, source_id: &str, synthetic_path: &str, ordinal: usize) -> Option<CanonicalNode> {
    if !entry.is_object() {
        return None;
    }
    let mut node = CanonicalNode::new(Platform::Web, format!("{source_id}:{ordinal}"));
    node.role = str_field(entry, &["role", "tag", "tagName"]).map(|r| r.to_lowercase());
    node.name = str_field(entry, &["name", "ariaLabel", "aria-label"]);
    node.text = str_field(entry, &["text", "innerText", "textContent"]).map(|t| collapse_ws(&t));
    node.visible = bool_field(entry, &["visible", "displayed"], true);
    node.selector = str_field(entry, &["path", "xpath", "selector"])
        .or_else(|| Some(synthetic_path.to_string()));
    node.bounds = rect_field(entry, &["rect", "bounds", "boundingClientRect"]);
    node.selector_key = attr_key(entry)
        .or_else(|| node.text.as_deref().and_then(selector_key::extract_key));

    if node.text.is_none() && node.name.is_none() && node.selector_key.is_none() {
        return None;
    }
    Some(node)
}

/// Selector-key straight from identification attributes, when present.
fn attr_key(entry: &Value) -> Option<String> {
    let attrs = entry.get("attributes").or_else(|| entry.get("attrs"))?;
    for key in ["data-qa", "data-testid", "dataQa", "dataTestid"] {
        if let Some(v) = attrs.get(key).and_then(Value::as_str) {
            let normalized = selector_key::normalize_key(v);
            if !normalized.is_empty() {
                return Some(normalized);
            }
        }
    }
    None
}
