//! Atlassian Document Format helpers.
//!
//! Jira REST v3 returns rich-text fields (issue descriptions) as ADF trees
//! and requires comment bodies in the same format.

use serde_json::{json, Value};

const ADF_BLOCK_NODE_TYPES: &[&str] = &[
    "paragraph",
    "heading",
    "blockquote",
    "codeBlock",
    "listItem",
    "panel",
    "tableCell",
    "tableHeader",
    "rule",
];

/// Wraps plain text in a single-paragraph ADF document.
pub fn comment_document(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{
                "type": "text",
                "text": text,
            }]
        }]
    })
}

/// Plain text of a rich-text field. Strings pass through unchanged, ADF
/// documents contribute their text nodes in document order with one line per
/// block. Anything else (including `null`) yields an empty string.
pub fn rich_text_to_plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(_) => {
            let mut rendered = String::new();
            collect_adf_text(value, &mut rendered);
            rendered.trim_end().to_string()
        }
        _ => String::new(),
    }
}

fn collect_adf_text(node: &Value, out: &mut String) {
    let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default();
    match node_type {
        "text" => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        "hardBreak" => out.push('\n'),
        "mention" | "emoji" => {
            if let Some(text) = node
                .get("attrs")
                .and_then(|attrs| attrs.get("text"))
                .and_then(Value::as_str)
            {
                out.push_str(text);
            }
        }
        _ => {}
    }

    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            collect_adf_text(child, out);
        }
    }

    if ADF_BLOCK_NODE_TYPES.contains(&node_type) && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
