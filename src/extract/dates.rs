//! Date parsing for update-history detection and staleness filtering.
//!
//! Spec documents mark revisions in several formats: Korean
//! `YYYY년 MM월 DD일`, ISO `YYYY-MM-DD`, dotted `YYYY.MM.DD`, 2-digit years,
//! and bare `MM/DD` (year inferred from context). The extractor takes the
//! most recent parsable date as the document's revision date and drops items
//! that are strictly older.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_KOREAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})\s*년\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일").expect("korean date regex")
});

static RE_YMD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})[-./](\d{1,2})[-./](\d{1,2})\b").expect("ymd date regex")
});

static RE_SHORT_YMD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{2})[-.](\d{1,2})[-.](\d{1,2})\b").expect("short ymd regex")
});

static RE_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})\b").expect("month/day regex"));

static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20\d{2})\b").expect("year regex"));

/// Parse one date-like string. `context_year` feeds the `MM/DD` form; when it
/// is unknown the `MM/DD` form is ignored rather than given a fabricated year.
pub fn parse_date(text: &str, context_year: Option<i32>) -> Option<NaiveDate> {
    if let Some(caps) = RE_KOREAN.captures(text) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = RE_YMD.captures(text) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = RE_SHORT_YMD.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        return NaiveDate::from_ymd_opt(2000 + year, caps[2].parse().ok()?, caps[3].parse().ok()?);
    }
    if let Some(caps) = RE_MONTH_DAY.captures(text) {
        let year = context_year?;
        return NaiveDate::from_ymd_opt(year, caps[1].parse().ok()?, caps[2].parse().ok()?);
    }
    None
}

fn ymd(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

/// Most recent 4-digit year mentioned anywhere — context for `MM/DD` dates.
pub fn context_year(text: &str) -> Option<i32> {
    RE_YEAR
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .max()
}

/// Scan free text for every date-like substring and return the maximum.
/// The whole-document fallback when no explicit history table exists.
pub fn latest_date_in(text: &str) -> Option<NaiveDate> {
    let year = context_year(text);
    let mut latest = None;
    for line in text.lines() {
        for candidate in date_candidates(line) {
            if let Some(date) = parse_date(candidate, year) {
                if latest.map(|l| date > l).unwrap_or(true) {
                    latest = Some(date);
                }
            }
        }
    }
    latest
}

/// Split a line into substrings that may each carry one date. Regex captures
/// only take the first match per pattern, so scan windows around separators.
fn date_candidates(line: &str) -> Vec<&str> {
    let mut spans: Vec<&str> = Vec::new();
    for re in [&*RE_KOREAN, &*RE_YMD, &*RE_SHORT_YMD, &*RE_MONTH_DAY] {
        for m in re.find_iter(line) {
            spans.push(m.as_str());
        }
    }
    spans
}

/// True when a line is only a date (plus separators) — metadata, not content.
pub fn is_date_only_line(line: &str) -> bool {
    let mut remainder = line.to_string();
    let mut matched_any = false;
    for re in [&*RE_KOREAN, &*RE_YMD, &*RE_SHORT_YMD, &*RE_MONTH_DAY] {
        if re.is_match(&remainder) {
            matched_any = true;
            remainder = re.replace_all(&remainder, "").to_string();
        }
    }
    if !matched_any {
        return false;
    }
    remainder
        .chars()
        .all(|c| c.is_whitespace() || matches!(c, '-' | '.' | ',' | ':' | '(' | ')' | '/' | '*'))
}

// ─── Update-history table detection ──────────────────────────────────────────

const HISTORY_DATE_WORDS: &[&str] = &["date", "날짜", "일자", "일시", "수정일", "작성일"];
const HISTORY_CONTENT_WORDS: &[&str] = &["content", "내용", "변경", "수정", "변경내용"];
const HISTORY_VERSION_WORDS: &[&str] = &["version", "버전", "차수", "ver", "ver."];
const HISTORY_LOCATION_WORDS: &[&str] = &["location", "위치", "페이지", "화면", "담당"];

/// A table is an update-history (revision log) table — metadata, not
/// requirements — when its header row matches at least two of the
/// {date, content, version, location} keyword groups.
pub fn is_history_header(cells: &[String]) -> bool {
    let groups: [&[&str]; 4] = [
        HISTORY_DATE_WORDS,
        HISTORY_CONTENT_WORDS,
        HISTORY_VERSION_WORDS,
        HISTORY_LOCATION_WORDS,
    ];
    let mut matched = 0;
    for group in groups {
        let hit = cells.iter().any(|cell| {
            let lower = cell.trim().to_lowercase();
            group.iter().any(|w| lower == *w || lower.contains(*w))
        });
        if hit {
            matched += 1;
        }
    }
    matched >= 2
}

/// Most recent parsable date across a history table's body rows.
pub fn latest_date_in_rows(rows: &[Vec<String>], context_year: Option<i32>) -> Option<NaiveDate> {
    let mut latest = None;
    for row in rows {
        for cell in row {
            if let Some(date) = parse_date(cell, context_year) {
                if latest.map(|l| date > l).unwrap_or(true) {
                    latest = Some(date);
                }
            }
        }
    }
    latest
}
