//! Selector-key extraction — stable cross-platform identifiers embedded in
//! spec prose or capture attributes.
//!
//! Three conventions are recognized:
//!   `[key:confirm.button]`, `data-qa="confirm-button"` / `data-testid=…`,
//!   and `(selector: confirm button)`.
//! Keys are normalized to `[a-z0-9._-]` so the same element matches across
//! design exports, DOM snapshots, and accessibility dumps.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_BRACKET_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[key:\s*([^\]]+)\]").expect("bracket key regex"));

static RE_ATTR_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"data-(?:qa|testid)\s*=\s*["']?([A-Za-z0-9 ._\-]+)["']?"#).expect("attr key regex")
});

static RE_PAREN_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(selector:\s*([^)]+)\)").expect("paren key regex"));

/// Normalize a raw key fragment: lowercase, whitespace becomes `.`, anything
/// outside `[a-z0-9._-]` is stripped, repeated separators collapse, edges trim.
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        let mapped = if ch.is_whitespace() { '.' } else { ch };
        if mapped.is_ascii_lowercase() || mapped.is_ascii_digit() || matches!(mapped, '.' | '_' | '-') {
            // Collapse runs of separators into a single one.
            if matches!(mapped, '.' | '_' | '-') {
                if matches!(out.chars().last(), Some('.') | Some('_') | Some('-')) {
                    continue;
                }
            }
            out.push(mapped);
        }
    }
    out.trim_matches(|c| matches!(c, '.' | '_' | '-')).to_string()
}

/// Extract an embedded selector-key from free text, if any convention matches.
pub fn extract_key(text: &str) -> Option<String> {
    for re in [&*RE_BRACKET_KEY, &*RE_ATTR_KEY, &*RE_PAREN_KEY] {
        if let Some(caps) = re.captures(text) {
            let key = normalize_key(&caps[1]);
            if !key.is_empty() {
                return Some(key);
            }
        }
    }
    None
}

/// Remove any recognized key fragment from the text, trimming leftover space.
pub fn strip_key(text: &str) -> String {
    let mut out = text.to_string();
    for re in [&*RE_BRACKET_KEY, &*RE_ATTR_KEY, &*RE_PAREN_KEY] {
        out = re.replace_all(&out, "").to_string();
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
