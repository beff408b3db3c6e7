//! Token-set (Jaccard) similarity over normalized word tokens.
//!
//! Tokens are lowercase whitespace-split words after NFD diacritic stripping
//! and zero-width-character removal, so visually identical strings from
//! different capture pipelines compare as equal.

use std::collections::HashSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const ZERO_WIDTH: &[char] = &['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}', '\u{2060}'];

/// Normalize one string into its comparison tokens.
pub fn tokens(text: &str) -> HashSet<String> {
    text.nfd()
        .filter(|c| !is_combining_mark(*c) && !ZERO_WIDTH.contains(c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// `|A ∩ B| / |A ∪ B|` over word tokens. Two empty strings are identical
/// (1.0); one empty side is maximally different (0.0).
pub fn token_set_similarity(a: &str, b: &str) -> f64 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    intersection as f64 / union as f64
}
