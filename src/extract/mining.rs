//! Content-cell text mining — turning messy spec prose into clean candidate
//! strings.
//!
//! Three extractors run over each content cell: labeled patterns
//! (`문구: …`, `display phrase: …`, `to-be: …`), quoted substrings, and
//! slash-delimited option lists. Every candidate then passes one shared
//! exclusion filter (URLs, ticket numbers, color labels, icon descriptions,
//! translation-key-shaped tokens) and a 2–100 character bound.

use once_cell::sync::Lazy;
use regex::Regex;

// ─── Labeled patterns ─────────────────────────────────────────────────────────

static RE_LABELED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:표시\s*문구|display\s*phrase|phrase|문구|to[- ]?be)\s*[:：]\s*([^\n<]+)",
    )
    .expect("labeled pattern regex")
});

static RE_QUOTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"]+)"|'([^']+)'|“([^”]+)”|‘([^’]+)’"#).expect("quoted regex")
});

/// Strings extracted by labeled patterns: `문구: 확인` ⇒ `확인`.
/// The capture stops at the next label, tag boundary, or line end.
pub fn labeled_candidates(cell: &str) -> Vec<String> {
    RE_LABELED
        .captures_iter(cell)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Quoted substrings in any of the four common quote styles.
pub fn quoted_candidates(text: &str) -> Vec<String> {
    RE_QUOTED
        .captures_iter(text)
        .filter_map(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
        })
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ─── Slash-delimited option lists ────────────────────────────────────────────

static RE_BRACKET_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").expect("bracket label regex"));

/// `확인 / 취소 / 닫기` ⇒ the individual options, cleaned of bracket labels.
/// Segments survive only when 2–30 characters long and UI-keyword-bearing.
pub fn slash_option_candidates(text: &str) -> Vec<String> {
    if text.matches('/').count() == 0 || text.contains("://") {
        return Vec::new();
    }
    let segments: Vec<String> = text
        .split('/')
        .map(|seg| RE_BRACKET_LABEL.replace_all(seg, "").trim().to_string())
        .filter(|seg| !seg.is_empty())
        .collect();
    if segments.len() < 2 {
        return Vec::new();
    }
    segments
        .into_iter()
        .filter(|seg| {
            let len = seg.chars().count();
            (2..=30).contains(&len) && bears_ui_keyword(seg)
        })
        .collect()
}

// ─── UI keyword test ──────────────────────────────────────────────────────────

const UI_KEYWORDS: &[&str] = &[
    "버튼", "팝업", "배너", "메뉴", "탭", "화면", "문구", "확인", "취소", "닫기", "로그인",
    "로그아웃", "알림", "안내", "동의", "설정", "저장", "삭제", "검색", "button", "popup",
    "banner", "menu", "tab", "screen", "dialog", "confirm", "cancel", "close", "login",
    "logout", "notice", "save", "delete", "search", "toast", "label",
];

/// True when the text mentions UI vocabulary — the bar a bare option segment
/// must clear to count as a requirement candidate.
pub fn bears_ui_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    UI_KEYWORDS.iter().any(|k| lower.contains(k))
}

// ─── Shared exclusion filter ─────────────────────────────────────────────────

static RE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://|www\.").expect("url regex"));

static RE_TICKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]{1,9}-\d+$").expect("ticket regex"));

static RE_TRANSLATION_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[._][a-z0-9]+){2,}$").expect("translation key regex")
});

static RE_HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{3,8}$").expect("hex color regex"));

const COLOR_NAMES: &[&str] = &[
    "red", "blue", "green", "yellow", "black", "white", "gray", "grey", "orange", "purple",
    "빨강", "파랑", "초록", "노랑", "검정", "흰색", "회색",
];

const ICON_PREFIXES: &[&str] = &["ic_", "icon_", "icn_", "아이콘"];

/// The shared exclusion filter every mined candidate must pass.
pub fn is_excluded(text: &str) -> bool {
    let trimmed = text.trim();
    if RE_URL.is_match(trimmed) || RE_TICKET.is_match(trimmed) {
        return true;
    }
    if RE_HEX_COLOR.is_match(trimmed) {
        return true;
    }
    let lower = trimmed.to_lowercase();
    if COLOR_NAMES.iter().any(|c| lower == *c) {
        return true;
    }
    if ICON_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    // Long dot- or underscore-delimited lowercase tokens resemble
    // translation keys.
    if RE_TRANSLATION_KEY.is_match(trimmed) {
        return true;
    }
    false
}

// ─── Length bound ─────────────────────────────────────────────────────────────

/// Enforce the 2–100 character bound, truncating overlong candidates to the
/// last full sentence, else the last full word, inside the limit.
pub fn bound_length(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len < 2 {
        return None;
    }
    if len <= 100 {
        return Some(trimmed.to_string());
    }
    let clipped: String = trimmed.chars().take(100).collect();
    if let Some((pos, ch)) = clipped
        .char_indices()
        .rev()
        .find(|(_, c)| matches!(c, '.' | '!' | '?' | '。'))
    {
        let sentence = clipped[..pos + ch.len_utf8()].trim();
        if sentence.chars().count() >= 2 {
            return Some(sentence.to_string());
        }
    }
    let words: Vec<&str> = clipped.split_whitespace().collect();
    if words.len() > 1 {
        let without_last = words[..words.len() - 1].join(" ");
        if without_last.chars().count() >= 2 {
            return Some(without_last);
        }
    }
    Some(clipped.trim().to_string())
}

/// Run all three extractors over a content cell, apply the exclusion filter
/// and length bound, and de-duplicate while preserving first-seen order.
pub fn mine_cell(cell: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |candidate: String| {
        if is_excluded(&candidate) {
            return;
        }
        if let Some(bounded) = bound_length(&candidate) {
            if !out.contains(&bounded) {
                out.push(bounded);
            }
        }
    };

    for c in labeled_candidates(cell) {
        push(c);
    }
    for c in quoted_candidates(cell) {
        push(c);
    }
    for c in slash_option_candidates(cell) {
        push(c);
    }
    out
}
