//! Plain-text requirement extraction — the fallback path when the spec
//! document carries no table structure.
//!
//! A line-by-line scan tracks a heading stack for section paths, drops
//! strikethrough (deprecated) and date-only (metadata) lines, then classifies
//! the rest: quoted substrings become TEXT items, "must be shown" phrasing
//! becomes a STATE item, and short or UI-keyword-bearing lines become TEXT
//! items unless a metadata blocklist catches them.

use once_cell::sync::Lazy;
use regex::Regex;

use super::dates;
use super::mining;
use crate::model::{ItemProvenance, RequirementItem, RequirementKind, VisibilityRequirement};
use crate::selector_key;

static RE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#{1,6})\s+(.+)$|^(\d+(?:\.\d+)*)[.)]?\s+(\S.*)$").expect("heading regex")
});

static RE_STRIKETHROUGH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^~~.*~~$").expect("strikethrough regex"));

static RE_MUST_SHOW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)must be (?:shown|displayed|visible)|노출되어야|표시되어야|노출\s*필수")
        .expect("must-show regex")
});

static RE_UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid regex")
});

const STRUCTURE_HEADERS: &[&str] = &[
    "목차",
    "개요",
    "revision history",
    "table of contents",
    "update history",
    "변경 이력",
    "히스토리",
];

/// Metadata blocklist for bare lines: ticket IDs, UUIDs, color names,
/// document-structure headers, boolean literals.
fn is_metadata_line(line: &str) -> bool {
    let trimmed = line.trim();
    let lower = trimmed.to_lowercase();
    if matches!(lower.as_str(), "true" | "false") {
        return true;
    }
    if RE_UUID.is_match(trimmed) {
        return true;
    }
    if STRUCTURE_HEADERS.iter().any(|h| lower == *h) {
        return true;
    }
    mining::is_excluded(trimmed)
}

/// Extract requirement items from plain spec text.
pub fn extract(text: &str, id_prefix: &str) -> Vec<RequirementItem> {
    let context_year = dates::context_year(text);
    let mut items = Vec::new();
    let mut heading_stack: Vec<(usize, String)> = Vec::new();

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line
            .trim()
            .trim_start_matches(['-', '*', '•'])
            .trim();
        if line.is_empty() {
            continue;
        }

        // Headings maintain the section path, and are not requirements.
        if let Some(caps) = RE_HEADING.captures(line) {
            let (level, title) = if let (Some(hashes), Some(title)) = (caps.get(1), caps.get(2)) {
                (hashes.as_str().len(), title.as_str())
            } else {
                let numbering = caps.get(3).map(|m| m.as_str()).unwrap_or("");
                (numbering.split('.').count(), caps.get(4).map(|m| m.as_str()).unwrap_or(""))
            };
            while heading_stack.last().map(|(l, _)| *l >= level).unwrap_or(false) {
                heading_stack.pop();
            }
            heading_stack.push((level, title.trim().to_string()));
            continue;
        }

        // Strikethrough marks deprecated content.
        if RE_STRIKETHROUGH.is_match(line) {
            continue;
        }

        let update_date = dates::parse_date(line, context_year);
        if dates::is_date_only_line(line) {
            continue;
        }

        let section_path: Vec<String> =
            heading_stack.iter().map(|(_, t)| t.clone()).collect();
        let make_item = |id: String, kind, text_value: Option<String>| {
            let (key, clean_text) = match &text_value {
                Some(t) => (
                    selector_key::extract_key(t),
                    Some(selector_key::strip_key(t)),
                ),
                None => (None, None),
            };
            RequirementItem {
                id,
                kind,
                selector: None,
                text: clean_text,
                visibility: None,
                conditions: Vec::new(),
                selector_key: key,
                section_path: section_path.clone(),
                expected: None,
                provenance: ItemProvenance {
                    source: Some("text".to_string()),
                    row: Some(line_no + 1),
                    column: None,
                    update_date,
                    table_sourced: false,
                },
            }
        };

        // Quoted substrings are the strongest signal for display text.
        let quoted = mining::quoted_candidates(line);
        if !quoted.is_empty() {
            for (i, q) in quoted.into_iter().enumerate() {
                if mining::is_excluded(&q) {
                    continue;
                }
                if let Some(bounded) = mining::bound_length(&q) {
                    items.push(make_item(
                        format!("{id_prefix}:l{}:q{i}", line_no + 1),
                        RequirementKind::Text,
                        Some(bounded),
                    ));
                }
            }
            continue;
        }

        // Visibility phrasing becomes a STATE requirement.
        if RE_MUST_SHOW.is_match(line) {
            let subject = RE_MUST_SHOW.replace_all(line, "").trim().to_string();
            let mut item = make_item(
                format!("{id_prefix}:l{}", line_no + 1),
                RequirementKind::State,
                Some(if subject.is_empty() { line.to_string() } else { subject }),
            );
            item.visibility = Some(VisibilityRequirement::Show);
            items.push(item);
            continue;
        }

        // Bare lines: short, or longer but UI-keyword-bearing, and not metadata.
        let char_len = line.chars().count();
        if (char_len <= 50 || mining::bears_ui_keyword(line)) && !is_metadata_line(line) {
            if let Some(bounded) = mining::bound_length(line) {
                items.push(make_item(
                    format!("{id_prefix}:l{}", line_no + 1),
                    RequirementKind::Text,
                    Some(bounded),
                ));
            }
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strikethrough_dropped() {
        let items = extract("~~leave button~~", "t");
        assert!(items.is_empty());
    }

    #[test]
    fn test_quoted_becomes_text_item() {
        let items = extract("버튼 문구는 \"확인\" 으로 한다", "t");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text.as_deref(), Some("확인"));
        assert_eq!(items[0].kind, RequirementKind::Text);
    }

    #[test]
    fn test_must_show_becomes_state_item() {
        let items = extract("로그인 배너 must be shown", "t");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, RequirementKind::State);
        assert_eq!(items[0].visibility, Some(VisibilityRequirement::Show));
    }

    #[test]
    fn test_section_path_tracks_headings() {
        let text = "# 로그인\n## 버튼\n확인 버튼 문구";
        let items = extract(text, "t");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].section_path, vec!["로그인", "버튼"]);
    }

    #[test]
    fn test_date_only_line_dropped() {
        let items = extract("2024-03-05", "t");
        assert!(items.is_empty());
    }

    #[test]
    fn test_metadata_blocklist() {
        assert!(extract("PROJ-1234", "t").is_empty());
        assert!(extract("true", "t").is_empty());
        assert!(extract("목차", "t").is_empty());
    }

    #[test]
    fn test_long_line_without_ui_keyword_dropped() {
        let long = "이것은 아주 길고 긴 설명 문장이며 사용자 인터페이스 용어를 전혀 포함하지 않는 순수한 배경 설명입니다 추가 설명이 계속 이어집니다";
        assert!(extract(long, "t").is_empty());
    }

    #[test]
    fn test_selector_key_carried() {
        let items = extract("확인 버튼 [key:ok.button]", "t");
        assert_eq!(items[0].selector_key.as_deref(), Some("ok.button"));
        assert_eq!(items[0].text.as_deref(), Some("확인 버튼"));
    }
}
