//! Plain-text spec normalizer — used when the spec document has no table
//! structure. Every non-empty trimmed line becomes a TEXT-role node with a
//! positional path, so fuzzy rules can still search the full spec surface.

use serde_json::Value;

use crate::model::{CanonicalDocument, CanonicalNode, Platform};

pub fn normalize(text: &str, source_id: &str) -> CanonicalDocument {
    let mut nodes = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut node = CanonicalNode::new(Platform::Spec, format!("{source_id}:{}", nodes.len()));
        node.role = Some("text".to_string());
        node.text = Some(trimmed.to_string());
        node.selector = Some(format!("line:{}", line_no + 1));
        node.metadata
            .insert("line".to_string(), Value::from(line_no + 1));
        nodes.push(node);
    }
    CanonicalDocument::new(Platform::Spec, source_id, nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_become_text_nodes() {
        let doc = normalize("로그인 화면\n\n  확인 버튼 노출  \n", "spec-1");
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0].selector.as_deref(), Some("line:1"));
        assert_eq!(doc.nodes[1].text.as_deref(), Some("확인 버튼 노출"));
        assert_eq!(doc.nodes[1].selector.as_deref(), Some("line:3"));
    }

    #[test]
    fn test_empty_input_empty_doc() {
        assert!(normalize("", "spec-2").is_empty());
    }
}
