//! Design-tool export normalizer.
//!
//! Accepts either a full node tree (root object with `children`) or a flat
//! "exported label list" (array of strings / `{label}` objects). Only leaf
//! text nodes survive: containers, invisible nodes, and authoring noise
//! (resolution labels, font hints, placeholder words, date/version stamps,
//! structural layer names) are dropped at the source.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::{bool_field, collapse_ws, rect_field, str_field};
use crate::model::{CanonicalDocument, CanonicalNode, Platform};
use crate::selector_key;

/// Closed set of accepted design payload shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DesignShape {
    /// Root object with a `children` (or `nodes`) array.
    Tree,
    /// Flat array of labels, either strings or objects carrying text.
    LabelList,
    Unknown,
}

fn classify(raw: &Value) -> DesignShape {
    match raw {
        Value::Object(obj) if obj.contains_key("children") || obj.contains_key("nodes") => {
            DesignShape::Tree
        }
        Value::Array(_) => DesignShape::LabelList,
        _ => DesignShape::Unknown,
    }
}

/// Normalize a design-tool export. Total: unknown shapes yield an empty doc.
pub fn normalize(raw: &Value, source_id: &str) -> CanonicalDocument {
    let mut nodes = Vec::new();
    match classify(raw) {
        DesignShape::Tree => {
            walk(raw, source_id, &mut nodes);
        }
        DesignShape::LabelList => {
            for (i, entry) in raw.as_array().into_iter().flatten().enumerate() {
                let text = match entry {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Object(_) => str_field(entry, &["label", "text", "characters"]),
                    _ => None,
                };
                let Some(text) = text.filter(|t| !t.is_empty()) else {
                    continue;
                };
                if is_authoring_noise(&text) {
                    continue;
                }
                let mut node = CanonicalNode::new(Platform::Design, format!("{source_id}:{i}"));
                node.role = Some("text".to_string());
                node.selector_key = selector_key::extract_key(&text);
                node.text = Some(collapse_ws(&selector_key::strip_key(&text)));
                if entry.is_object() {
                    node.bounds = rect_field(entry, &["bounds", "absoluteBoundingBox"]);
                }
                nodes.push(node);
            }
        }
        DesignShape::Unknown => {
            debug!(source = source_id, "design payload shape not recognized — empty document");
        }
    }
    CanonicalDocument::new(Platform::Design, source_id, nodes)
}

/// Depth-first walk keeping leaf text nodes only.
fn walk(value: &Value, source_id: &str, out: &mut Vec<CanonicalNode>) {
    let Some(obj) = value.as_object() else { return };

    if !bool_field(value, &["visible"], true) {
        return;
    }

    let children = obj
        .get("children")
        .or_else(|| obj.get("nodes"))
        .and_then(Value::as_array);

    if let Some(children) = children.filter(|c| !c.is_empty()) {
        // Container — recurse, drop the container itself.
        for child in children {
            walk(child, source_id, out);
        }
        return;
    }

    let Some(text) = str_field(value, &["characters", "text", "label"]) else {
        return;
    };
    if is_authoring_noise(&text) {
        return;
    }

    let mut node = CanonicalNode::new(Platform::Design, format!("{source_id}:{}", out.len()));
    node.role = Some("text".to_string());
    node.name = str_field(value, &["name"]).filter(|n| !is_structural_name(n));
    node.selector_key = selector_key::extract_key(&text)
        .or_else(|| node.name.as_deref().and_then(selector_key::extract_key));
    node.text = Some(collapse_ws(&selector_key::strip_key(&text)));
    node.bounds = rect_field(value, &["absoluteBoundingBox", "bounds"]);
    out.push(node);
}

// ─── Authoring-noise classifier ──────────────────────────────────────────────

static RE_RESOLUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d{2,5}\s*[*xX×]\s*\d{2,5}\s*$").expect("resolution regex"));

static RE_FONT_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,3}\s*(px|pt|sp|dp)|(bold|regular|medium|semibold)\s*/?\s*\d*)\s*$")
        .expect("font hint regex")
});

static RE_DATE_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(v?\d+\.\d+(\.\d+)?|\d{4}[-./]\d{1,2}[-./]\d{1,2}\.?)\s*$")
        .expect("date/version regex")
});

const PLACEHOLDER_WORDS: &[&str] = &[
    "placeholder",
    "lorem",
    "ipsum",
    "tbd",
    "todo",
    "sample",
    "dummy",
    "텍스트",
    "임시",
];

const STRUCTURAL_NAMES: &[&str] = &[
    "frame",
    "group",
    "rectangle",
    "component",
    "instance",
    "vector",
    "ellipse",
    "line",
    "slice",
    "union",
];

/// True for text a designer typed for themselves, not for the product:
/// resolution labels (`583 * 300`), font-size hints, placeholder words,
/// date/version stamps, structural layer names.
pub fn is_authoring_noise(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    if RE_RESOLUTION.is_match(trimmed)
        || RE_FONT_HINT.is_match(trimmed)
        || RE_DATE_VERSION.is_match(trimmed)
    {
        return true;
    }
    let lower = trimmed.to_lowercase();
    if PLACEHOLDER_WORDS.iter().any(|w| lower == *w) {
        return true;
    }
    is_structural_name(&lower)
}

fn is_structural_name(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    STRUCTURAL_NAMES
        .iter()
        .any(|s| lower == *s || lower.starts_with(&format!("{s} ")))
}
