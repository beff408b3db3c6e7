//! Capture normalizers — raw platform payloads in, canonical documents out.
//!
//! `normalize` is total for every platform: an unparsable payload yields an
//! empty (or placeholder) document, never an error. Each normalizer classifies
//! its input into a small closed set of shapes first and dispatches on that,
//! so every variant transforms independently.

pub mod design;
pub mod dom;
pub mod mobile;
pub mod spec_text;

use serde_json::Value;

use crate::model::Rect;

// ─── Shared field helpers ─────────────────────────────────────────────────────

/// First non-empty string among the named fields of a JSON object.
pub(crate) fn str_field(obj: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = obj.get(*key).and_then(Value::as_str) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Boolean field with a default; tolerates `"true"`/`"false"` strings.
pub(crate) fn bool_field(obj: &Value, keys: &[&str], default: bool) -> bool {
    for key in keys {
        match obj.get(*key) {
            Some(Value::Bool(b)) => return *b,
            Some(Value::String(s)) => match s.as_str() {
                "true" => return true,
                "false" => return false,
                _ => {}
            },
            _ => {}
        }
    }
    default
}

/// Rectangle from any of the named fields, accepting `{x,y,width,height}`
/// or `{x,y,w,h}` spellings. Geometry is copied verbatim, never recomputed.
pub(crate) fn rect_field(obj: &Value, keys: &[&str]) -> Option<Rect> {
    for key in keys {
        if let Some(b) = obj.get(*key) {
            let x = b.get("x").and_then(Value::as_f64)?;
            let y = b.get("y").and_then(Value::as_f64)?;
            let w = b
                .get("width")
                .or_else(|| b.get("w"))
                .and_then(Value::as_f64)?;
            let h = b
                .get("height")
                .or_else(|| b.get("h"))
                .and_then(Value::as_f64)?;
            return Some(Rect { x, y, w, h });
        }
    }
    None
}

/// Collapse internal whitespace runs and trim.
pub(crate) fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_str_field_skips_empty() {
        let v = json!({"a": "  ", "b": "hello"});
        assert_eq!(str_field(&v, &["a", "b"]), Some("hello".to_string()));
    }

    #[test]
    fn test_bool_field_string_forms() {
        let v = json!({"visible": "false"});
        assert!(!bool_field(&v, &["visible"], true));
        assert!(bool_field(&json!({}), &["visible"], true));
    }

    #[test]
    fn test_rect_field_both_spellings() {
        let v = json!({"bounds": {"x": 1.0, "y": 2.0, "w": 3.0, "h": 4.0}});
        let r = rect_field(&v, &["bounds"]).unwrap();
        assert_eq!(r.w, 3.0);

        let v = json!({"absoluteBoundingBox": {"x": 0.0, "y": 0.0, "width": 583.0, "height": 300.0}});
        let r = rect_field(&v, &["absoluteBoundingBox"]).unwrap();
        assert_eq!(r.w, 583.0);
    }
}
