//! Spec input normalization — undo one level of string-literal escaping and
//! HTML-entity encoding.
//!
//! Wiki exports frequently arrive double-escaped (`\"<table>…"`) or
//! entity-encoded (`&lt;table&gt;…`). Each undo step is accepted only when it
//! reveals a literal table tag; otherwise the input is left untouched.

/// Decode a raw spec payload as far as a literal `<table` appears.
pub fn decode_spec_input(raw: &str) -> String {
    let mut current = raw.to_string();

    if !has_table_tag(&current) {
        let unescaped = unescape_string_literal(&current);
        if has_table_tag(&unescaped) {
            current = unescaped;
        }
    }
    if !has_table_tag(&current) {
        let decoded = decode_entities(&current);
        if has_table_tag(&decoded) {
            current = decoded;
        }
    }
    current
}

pub fn has_table_tag(text: &str) -> bool {
    text.to_lowercase().contains("<table")
}

/// Undo one level of string-literal escaping: `\"` `\n` `\t` `\\` `\/` and
/// `\uXXXX` sequences. Unrecognized escapes pass through verbatim.
pub fn unescape_string_literal(input: &str) -> String {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('u') => {
                let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Decode the common named HTML entities plus numeric references.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest.bytes().take(12).position(|b| b == b';') else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..end];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" | "#39" => Some('\''),
            "nbsp" => Some(' '),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|h| u32::from_str_radix(h, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
