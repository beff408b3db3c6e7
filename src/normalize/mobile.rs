//! Mobile accessibility-dump normalizers — one shared algorithm, two
//! platform-specific field tables (Android view hierarchy, iOS accessibility
//! tree).
//!
//! Accepted shapes: a single root object with `children`, or a flat node
//! list. When neither matches, one placeholder root is emitted whose metadata
//! carries the payload's top-level keys, so a broken capture stays visible in
//! diagnostics instead of vanishing.

use serde_json::Value;
use tracing::debug;

use super::{bool_field, collapse_ws, rect_field, str_field};
use crate::model::{CanonicalDocument, CanonicalNode, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MobileShape {
    Rooted,
    Flat,
    Unknown,
}

/// Per-platform capture vocabulary.
struct FieldTable {
    role: &'static [&'static str],
    name: &'static [&'static str],
    text: &'static [&'static str],
    visible: &'static [&'static str],
    bounds: &'static [&'static str],
    path: &'static [&'static str],
}

const ANDROID_FIELDS: FieldTable = FieldTable {
    role: &["class", "className", "role"],
    name: &["content-desc", "contentDescription", "resource-id", "resourceId"],
    text: &["text"],
    visible: &["visible", "displayed"],
    bounds: &["bounds", "rect"],
    path: &["path", "xpath"],
};

const IOS_FIELDS: FieldTable = FieldTable {
    role: &["type", "className", "role"],
    name: &["name", "identifier"],
    text: &["label", "value", "text"],
    visible: &["visible", "isVisible"],
    bounds: &["rect", "frame", "bounds"],
    path: &["path", "xpath"],
};

pub fn normalize_android(raw: &Value, source_id: &str) -> CanonicalDocument {
    normalize_with(raw, source_id, Platform::Android, &ANDROID_FIELDS)
}

pub fn normalize_ios(raw: &Value, source_id: &str) -> CanonicalDocument {
    normalize_with(raw, source_id, Platform::Ios, &IOS_FIELDS)
}

fn classify(raw: &Value) -> MobileShape {
    match raw {
        Value::Object(obj) if obj.contains_key("children") => MobileShape::Rooted,
        Value::Array(_) => MobileShape::Flat,
        _ => MobileShape::Unknown,
    }
}

fn normalize_with(
    raw: &Value,
    source_id: &str,
    platform: Platform,
    fields: &FieldTable,
) -> CanonicalDocument {
    let mut nodes = Vec::new();
    match classify(raw) {
        MobileShape::Rooted => {
            walk(raw, source_id, platform, fields, "", &mut nodes);
        }
        MobileShape::Flat => {
            for entry in raw.as_array().into_iter().flatten() {
                let path = format!("/[{}]", nodes.len());
                if let Some(node) = node_from(entry, source_id, platform, fields, &path, nodes.len())
                {
                    nodes.push(node);
                }
            }
        }
        MobileShape::Unknown => {
            debug!(
                source = source_id,
                platform = platform.as_str(),
                "mobile payload shape not recognized — emitting placeholder root"
            );
            nodes.push(placeholder_root(raw, source_id, platform));
        }
    }
    CanonicalDocument::new(platform, source_id, nodes)
}

fn walk(
    value: &Value,
    source_id: &str,
    platform: Platform,
    fields: &FieldTable,
    parent_path: &str,
    out: &mut Vec<CanonicalNode>,
) {
    let path = format!("{parent_path}/[{}]", out.len());
    if let Some(node) = node_from(value, source_id, platform, fields, &path, out.len()) {
        out.push(node);
    }
    for child in value
        .get("children")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        walk(child, source_id, platform, fields, &path, out);
    }
}

fn node_from(
    entry: &Value,
    source_id: &str,
    platform: Platform,
    fields: &FieldTable,
    synthetic_path: &str,
    ordinal: usize,
) -> Option<CanonicalNode> {
    if !entry.is_object() {
        return None;
    }
    let mut node = CanonicalNode::new(platform, format!("{source_id}:{ordinal}"));
    node.role = str_field(entry, fields.role);
    node.name = str_field(entry, fields.name);
    node.text = str_field(entry, fields.text).map(|t| collapse_ws(&t));
    node.visible = bool_field(entry, fields.visible, true);
    node.bounds = rect_field(entry, fields.bounds);
    node.selector = str_field(entry, fields.path).or_else(|| Some(synthetic_path.to_string()));

    if node.text.is_none() && node.name.is_none() && node.role.is_none() {
        return None;
    }
    Some(node)
}

/// Diagnostic stand-in for an unrecognized payload: one root node whose
/// metadata lists the top-level keys that were actually present.
fn placeholder_root(raw: &Value, source_id: &str, platform: Platform) -> CanonicalNode {
    let mut node = CanonicalNode::new(platform, format!("{source_id}:placeholder"));
    node.role = Some("unknown".to_string());
    node.selector = Some("/".to_string());
    let keys: Vec<Value> = raw
        .as_object()
        .map(|o| o.keys().cloned().map(Value::String).collect())
        .unwrap_or_default();
    node.metadata
        .insert("topLevelKeys".to_string(), Value::Array(keys));
    node.metadata
        .insert("unrecognizedShape".to_string(), Value::Bool(true));
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_android_rooted_tree() {
        let raw = json!({
            "class": "android.widget.FrameLayout",
            "children": [
                {"class": "android.widget.TextView", "text": "로그인",
                 "content-desc": "login_title", "visible": true},
                {"class": "android.widget.Button", "text": "확인"}
            ]
        });
        let doc = normalize_android(&raw, "adb-1");
        assert_eq!(doc.platform, Platform::Android);
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.nodes[1].name.as_deref(), Some("login_title"));
    }

    #[test]
    fn test_ios_flat_list() {
        let raw = json!([
            {"type": "XCUIElementTypeStaticText", "label": "로그인", "identifier": "loginTitle"},
            {"type": "XCUIElementTypeButton", "label": "확인"}
        ]);
        let doc = normalize_ios(&raw, "xc-1");
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0].text.as_deref(), Some("로그인"));
        assert_eq!(doc.nodes[0].name.as_deref(), Some("loginTitle"));
    }

    #[test]
    fn test_unknown_shape_placeholder() {
        let raw = json!({"sessionId": "abc", "error": "timeout"});
        let doc = normalize_android(&raw, "adb-2");
        assert_eq!(doc.nodes.len(), 1);
        let keys = doc.nodes[0].metadata.get("topLevelKeys").unwrap();
        assert!(keys.as_array().unwrap().iter().any(|k| k == "sessionId"));
    }
}
