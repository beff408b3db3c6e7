//! Requirement extractor — specification documents in, ordered requirement
//! items out.
//!
//! Handles plain text and HTML, including double-escaped and entity-encoded
//! exports. Total: nothing here raises. When every structured path fails, a
//! last-resort labeled-pattern re-scan of the raw markup recovers whatever
//! strings it can, and the worst case is an empty item list.

pub mod dates;
pub mod decode;
pub mod keywords;
pub mod mining;
pub mod tables;
pub mod text_fallback;

use chrono::NaiveDate;
use tracing::debug;

use crate::model::{ItemProvenance, RequirementItem, RequirementKind};
use crate::selector_key;
use keywords::{ColumnRole, KeywordConfig};

/// Extractor output: items plus the document's detected latest revision date.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub items: Vec<RequirementItem>,
    pub latest_date: Option<NaiveDate>,
}

/// Requirement extractor with an explicit keyword configuration — extraction
/// stays a pure function of its inputs.
#[derive(Debug, Clone, Default)]
pub struct RequirementExtractor {
    config: KeywordConfig,
}

impl RequirementExtractor {
    pub fn new(config: KeywordConfig) -> Self {
        Self { config }
    }

    /// Run the full extraction pipeline over a raw spec document.
    pub fn extract(&self, raw: &str, id_prefix: &str) -> Extraction {
        let decoded = decode::decode_spec_input(raw);
        let context_year = dates::context_year(&decoded);

        let mut all_tables = tables::extract_tables(&decoded, &self.config);

        // Update-history tables are metadata: pull the revision date out of
        // them and keep them away from requirement mining.
        let mut latest_date: Option<NaiveDate> = None;
        all_tables.retain(|table| {
            let header = &table.rows[table.header_row];
            if dates::is_history_header(header) {
                let date = dates::latest_date_in_rows(table.body_rows(), context_year);
                if date > latest_date {
                    latest_date = date;
                }
                return false;
            }
            true
        });
        // Absent an explicit history table, scan the whole document.
        if latest_date.is_none() {
            latest_date = dates::latest_date_in(&decoded);
        }

        // Table mining when structure was recovered; plain-text fallback only
        // when the document shows no table markup at all. Tag soup that looks
        // like a table but parses to nothing falls through to the re-scan.
        let mut items = if !all_tables.is_empty() {
            self.mine_tables(&all_tables, id_prefix, context_year)
        } else if !decode::has_table_tag(&decoded) {
            text_fallback::extract(&decoded, id_prefix)
        } else {
            Vec::new()
        };

        // Staleness filter: drop items strictly older than the revision date.
        if let Some(latest) = latest_date {
            items.retain(|item| match item.provenance.update_date {
                Some(d) => d >= latest,
                None => true,
            });
        }

        // Last resort: re-scan the raw markup with the labeled-pattern
        // extractors so a badly mangled document still yields something.
        if items.is_empty() {
            debug!(prefix = id_prefix, "structured extraction yielded nothing — rescanning raw markup");
            items = self.rescan_raw(raw, id_prefix);
        }

        Extraction { items, latest_date }
    }

    /// Mine TEXT requirements out of every non-history table's content cells.
    fn mine_tables(
        &self,
        spec_tables: &[tables::SpecTable],
        id_prefix: &str,
        context_year: Option<i32>,
    ) -> Vec<RequirementItem> {
        let mut items = Vec::new();
        for (t_idx, table) in spec_tables.iter().enumerate() {
            let content_col = table.column_index(ColumnRole::Content);
            let item_col = table.column_index(ColumnRole::Item);

            for (r_idx, row) in table.body_rows().iter().enumerate() {
                let Some(cell) = content_col.and_then(|c| row.get(c)) else {
                    continue;
                };
                let update_date = row
                    .iter()
                    .find_map(|c| dates::parse_date(c, context_year));
                let section = item_col
                    .and_then(|c| row.get(c))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());

                for (c_idx, candidate) in mining::mine_cell(cell).into_iter().enumerate() {
                    let key = selector_key::extract_key(&candidate)
                        .or_else(|| selector_key::extract_key(cell));
                    let text = selector_key::strip_key(&candidate);
                    if text.is_empty() {
                        continue;
                    }
                    items.push(RequirementItem {
                        id: format!("{id_prefix}:t{t_idx}:r{r_idx}:c{c_idx}"),
                        kind: RequirementKind::Text,
                        selector: None,
                        text: Some(text),
                        visibility: None,
                        conditions: Vec::new(),
                        selector_key: key,
                        section_path: section.clone().into_iter().collect(),
                        expected: None,
                        provenance: ItemProvenance {
                            source: Some("table".to_string()),
                            row: Some(r_idx),
                            column: content_col,
                            update_date,
                            table_sourced: true,
                        },
                    });
                }
            }
        }
        items
    }

    /// Labeled-pattern scan straight over the raw (undecoded) markup.
    fn rescan_raw(&self, raw: &str, id_prefix: &str) -> Vec<RequirementItem> {
        let mut items = Vec::new();
        for (i, candidate) in mining::labeled_candidates(raw).into_iter().enumerate() {
            if mining::is_excluded(&candidate) {
                continue;
            }
            let Some(bounded) = mining::bound_length(&candidate) else {
                continue;
            };
            let mut item = RequirementItem::text_item(format!("{id_prefix}:rescan{i}"), bounded);
            item.provenance.source = Some("rescan".to_string());
            items.push(item);
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RequirementExtractor {
        RequirementExtractor::default()
    }

    #[test]
    fn test_table_content_cell_mining() {
        let html = r#"
            <table>
              <tr><th>No</th><th>항목</th><th>내용</th></tr>
              <tr><td>1</td><td>로그인</td><td>문구: 확인</td></tr>
            </table>"#;
        let out = extractor().extract(html, "spec");
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].text.as_deref(), Some("확인"));
        assert!(out.items[0].provenance.table_sourced);
        assert_eq!(out.items[0].section_path, vec!["로그인"]);
    }

    #[test]
    fn test_history_table_is_metadata_not_requirements() {
        let html = r#"
            <table>
              <tr><th>날짜</th><th>버전</th><th>변경내용</th></tr>
              <tr><td>2024-01-01</td><td>1.0</td><td>초안</td></tr>
              <tr><td>2024-03-05</td><td>1.1</td><td>개편</td></tr>
            </table>
            <table>
              <tr><th>항목</th><th>내용</th></tr>
              <tr><td>로그인</td><td>문구: 확인</td></tr>
            </table>"#;
        let out = extractor().extract(html, "spec");
        assert_eq!(
            out.latest_date,
            chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].text.as_deref(), Some("확인"));
    }

    #[test]
    fn test_staleness_filter() {
        // The row dated 2024-01-01 is strictly older than the document's
        // detected latest date and must be dropped.
        let html = r#"
            <table>
              <tr><th>항목</th><th>내용</th><th>업데이트</th></tr>
              <tr><td>a</td><td>문구: 옛날 문구</td><td>2024-01-01</td></tr>
              <tr><td>b</td><td>문구: 새 문구</td><td>2024-03-05</td></tr>
            </table>"#;
        let out = extractor().extract(html, "spec");
        let texts: Vec<_> = out.items.iter().filter_map(|i| i.text.as_deref()).collect();
        assert_eq!(texts, vec!["새 문구"]);
    }

    #[test]
    fn test_double_escaped_input() {
        let raw = r#""<table><tr><th>항목</th><th>내용</th></tr><tr><td>a</td><td>문구: 확인</td></tr></table>""#;
        let out = extractor().extract(raw, "spec");
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].text.as_deref(), Some("확인"));
    }

    #[test]
    fn test_plain_text_fallback_path() {
        let out = extractor().extract("# 로그인\n\"확인\" 버튼\n~~leave button~~", "spec");
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].text.as_deref(), Some("확인"));
        assert!(!out.items[0].provenance.table_sourced);
    }

    #[test]
    fn test_total_failure_yields_empty_not_panic() {
        let out = extractor().extract("", "spec");
        assert!(out.items.is_empty());
    }

    #[test]
    fn test_rescan_recovers_labeled_strings() {
        // Mangled markup where table recovery fails but labels survive.
        let raw = "<table><broken><<<문구: 확인>>>";
        let out = extractor().extract(raw, "spec");
        assert!(!out.items.is_empty());
        assert_eq!(out.items[0].provenance.source.as_deref(), Some("rescan"));
    }
}
