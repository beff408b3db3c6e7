//! HTML table extraction for the requirement extractor.
//!
//! Spec exports are semi-structured HTML at best, so tables are recovered
//! with a depth-counting tag scan rather than a full DOM parse. Nested
//! tables merge into their parent (their rows read as parent rows). Tables
//! are de-duplicated by stable identifier or first-row text, keeping the
//! highest-scoring copy.

use once_cell::sync::Lazy;
use regex::Regex;

use super::decode::decode_entities;
use super::keywords::{ColumnRole, KeywordConfig};

/// One recovered table: raw cell text by row, plus header/column metadata.
#[derive(Debug, Clone)]
pub struct SpecTable {
    /// `id` attribute on the table tag, when present.
    pub id_attr: Option<String>,
    pub rows: Vec<Vec<String>>,
    /// Index of the header row inside `rows`.
    pub header_row: usize,
    /// Column role per header cell (keyword-matched or positional).
    pub columns: Vec<ColumnRole>,
    /// Header cells that matched a keyword synonym (the dominant score term).
    pub header_matches: usize,
}

impl SpecTable {
    /// Body rows (everything after the header).
    pub fn body_rows(&self) -> &[Vec<String>] {
        &self.rows[self.header_row + 1..]
    }

    /// Index of the first column with the given role.
    pub fn column_index(&self, role: ColumnRole) -> Option<usize> {
        self.columns.iter().position(|c| *c == role)
    }

    /// De-duplication identity: explicit id attribute, else first-row text.
    fn identity(&self) -> String {
        if let Some(id) = &self.id_attr {
            return format!("id:{id}");
        }
        format!("row:{}", self.rows.first().map(|r| r.join("|")).unwrap_or_default())
    }

    /// Ranking for duplicates: header-keyword matches dominate, then row
    /// count, then cell count, then total text length.
    fn score(&self) -> (usize, usize, usize, usize) {
        let cells: usize = self.rows.iter().map(Vec::len).sum();
        let text_len: usize = self.rows.iter().flatten().map(String::len).sum();
        (self.header_matches, self.rows.len(), cells, text_len)
    }
}

static RE_TABLE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<table[^>]*\bid\s*=\s*["']?([A-Za-z0-9._\-]+)"#).expect("table id regex")
});

static RE_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr\s*>").expect("row regex"));

static RE_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<t[dh][^>]*>(.*?)</t[dh]\s*>").expect("cell regex"));

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("tag strip regex"));

static RE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("break regex"));

/// Extract all top-level tables from decoded HTML.
pub fn extract_tables(html: &str, config: &KeywordConfig) -> Vec<SpecTable> {
    let mut tables = Vec::new();
    for span in top_level_table_spans(html) {
        if let Some(table) = parse_table(span, config) {
            tables.push(table);
        }
    }
    dedup_tables(tables)
}

/// Byte spans of outermost `<table>…</table>` regions. Depth counting keeps
/// nested tables inside their parent's span so their rows merge upward.
fn top_level_table_spans(html: &str) -> Vec<&str> {
    static RE_TABLE_TAG: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)</?table\b").expect("table tag regex"));

    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for m in RE_TABLE_TAG.find_iter(html) {
        let closing = html[m.start()..].starts_with("</");
        if !closing {
            if depth == 0 {
                start = m.start();
            }
            depth += 1;
        } else if depth > 0 {
            depth -= 1;
            if depth == 0 {
                // Include through the end of the closing tag.
                let end = html[m.start()..]
                    .find('>')
                    .map(|p| m.start() + p + 1)
                    .unwrap_or(html.len());
                spans.push(&html[start..end]);
            }
        }
    }
    spans
}

fn parse_table(span: &str, config: &KeywordConfig) -> Option<SpecTable> {
    let id_attr = RE_TABLE_ID.captures(span).map(|c| c[1].to_string());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row_caps in RE_ROW.captures_iter(span) {
        let cells: Vec<String> = RE_CELL
            .captures_iter(&row_caps[1])
            .map(|c| clean_cell(&c[1]))
            .collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    if rows.is_empty() {
        return None;
    }

    // Header detection: keyword-score the first few rows; best wins, ties go
    // to the earliest row.
    let mut header_row = 0;
    let mut header_matches = 0;
    for (i, row) in rows.iter().take(3).enumerate() {
        let matches = row
            .iter()
            .filter(|cell| config.role_for_header(cell).is_some())
            .count();
        if matches > header_matches {
            header_matches = matches;
            header_row = i;
        }
    }

    let columns = rows[header_row]
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            config
                .role_for_header(cell)
                .unwrap_or_else(|| ColumnRole::positional(i))
        })
        .collect();

    Some(SpecTable {
        id_attr,
        rows,
        header_row,
        columns,
        header_matches,
    })
}

/// Strip markup from a cell, preserving line breaks as newlines.
pub fn clean_cell(cell_html: &str) -> String {
    let with_breaks = RE_BREAK.replace_all(cell_html, "\n");
    let stripped = RE_TAG.replace_all(&with_breaks, " ");
    let decoded = decode_entities(&stripped);
    decoded
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keep the highest-scoring table per structural identity.
fn dedup_tables(tables: Vec<SpecTable>) -> Vec<SpecTable> {
    let mut kept: Vec<SpecTable> = Vec::new();
    for table in tables {
        match kept.iter_mut().find(|t| t.identity() == table.identity()) {
            Some(existing) => {
                if table.score() > existing.score() {
                    *existing = table;
                }
            }
            None => kept.push(table),
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> KeywordConfig {
        KeywordConfig::default()
    }

    #[test]
    fn test_simple_table() {
        let html = r#"
            <table id="req-1">
              <tr><th>No</th><th>항목</th><th>내용</th></tr>
              <tr><td>1</td><td>로그인</td><td>문구: 확인</td></tr>
            </table>"#;
        let tables = extract_tables(html, &cfg());
        assert_eq!(tables.len(), 1);
        let t = &tables[0];
        assert_eq!(t.id_attr.as_deref(), Some("req-1"));
        assert_eq!(t.header_row, 0);
        assert_eq!(t.column_index(ColumnRole::Content), Some(2));
        assert_eq!(t.body_rows()[0][2], "문구: 확인");
    }

    #[test]
    fn test_nested_table_merges_into_parent() {
        let html = r#"
            <table>
              <tr><th>항목</th><th>내용</th></tr>
              <tr><td>outer</td><td>
                <table><tr><td>inner-a</td><td>inner-b</td></tr></table>
              </td></tr>
            </table>"#;
        let tables = extract_tables(html, &cfg());
        assert_eq!(tables.len(), 1);
        // Inner rows read as parent rows.
        assert!(tables[0]
            .rows
            .iter()
            .any(|r| r.iter().any(|c| c == "inner-a")));
    }

    #[test]
    fn test_positional_columns_when_no_keywords() {
        let html = "<table><tr><td>a</td><td>b</td><td>c</td><td>d</td></tr>\
                    <tr><td>1</td><td>x</td><td>y</td><td>z</td></tr></table>";
        let tables = extract_tables(html, &cfg());
        assert_eq!(tables[0].columns[3], ColumnRole::Content);
    }

    #[test]
    fn test_dedup_keeps_higher_scoring_copy() {
        let html = r#"
            <table id="dup"><tr><td>로그인</td></tr></table>
            <table id="dup">
              <tr><th>항목</th><th>내용</th></tr>
              <tr><td>로그인</td><td>문구: 확인</td></tr>
            </table>"#;
        let tables = extract_tables(html, &cfg());
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 2);
    }

    #[test]
    fn test_cell_cleaning() {
        assert_eq!(clean_cell("문구:<br/> <b>확인</b>"), "문구:\n확인");
        assert_eq!(clean_cell("&lt;확인&gt;"), "<확인>");
    }
}
