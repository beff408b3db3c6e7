//! Data-driven keyword configuration for table-header recognition.
//!
//! The column-role synonym table is passed into the extractor's constructor
//! (never read from ambient state), with a compiled-in default covering the
//! English and Korean header vocabulary seen in real spec documents.

use serde::{Deserialize, Serialize};

/// Semantic role of a spec-table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    No,
    Item,
    Attribute,
    Content,
    Note,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::No => "no",
            ColumnRole::Item => "item",
            ColumnRole::Attribute => "attribute",
            ColumnRole::Content => "content",
            ColumnRole::Note => "note",
        }
    }

    /// Positional fallback when a header cell matches no synonym set.
    pub fn positional(index: usize) -> ColumnRole {
        match index {
            0 => ColumnRole::No,
            1 => ColumnRole::Item,
            2 => ColumnRole::Attribute,
            3 => ColumnRole::Content,
            _ => ColumnRole::Note,
        }
    }
}

/// Header synonyms per column role. Deserializable so callers can ship their
/// own vocabulary; `Default` is the compiled-in table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub no: Vec<String>,
    pub item: Vec<String>,
    pub attribute: Vec<String>,
    pub content: Vec<String>,
    pub note: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        Self {
            no: owned(&["no", "no.", "#", "번호", "순번", "index"]),
            item: owned(&["item", "항목", "구분", "메뉴", "화면", "element", "영역"]),
            attribute: owned(&["attribute", "속성", "type", "유형", "구성요소", "컴포넌트"]),
            content: owned(&["content", "내용", "설명", "문구", "상세", "description", "copy"]),
            note: owned(&["note", "비고", "참고", "기타", "remark", "etc"]),
        }
    }
}

impl KeywordConfig {
    /// Match a header cell against the synonym sets. Comparison is
    /// case-insensitive and ignores surrounding whitespace.
    pub fn role_for_header(&self, header: &str) -> Option<ColumnRole> {
        let normalized = header.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        let sets: [(&[String], ColumnRole); 5] = [
            (&self.no, ColumnRole::No),
            (&self.item, ColumnRole::Item),
            (&self.attribute, ColumnRole::Attribute),
            (&self.content, ColumnRole::Content),
            (&self.note, ColumnRole::Note),
        ];
        for (synonyms, role) in sets {
            if synonyms.iter().any(|s| normalized == s.to_lowercase()) {
                return Some(role);
            }
        }
        // Containment pass: "표시 문구" should still read as a content column.
        for (synonyms, role) in [
            (&self.content, ColumnRole::Content),
            (&self.item, ColumnRole::Item),
            (&self.attribute, ColumnRole::Attribute),
            (&self.note, ColumnRole::Note),
        ] {
            if synonyms
                .iter()
                .any(|s| s.len() > 1 && normalized.contains(&s.to_lowercase()))
            {
                return Some(role);
            }
        }
        None
    }
}
