//! Writes a document tree back out as DUML lines.
//!
//! DUML has no escaping, so only trees whose keys and values survive a
//! re-parse unchanged are accepted.

use crate::error::{DumlError, Result};
use crate::model::node::Node;

/// Render `node` as one `dotted.key value` line per stored value.
///
/// Empty leaves and empty objects produce no lines.
pub fn render(node: &Node) -> Result<String> {
    let mut out = String::new();
    let mut path = Vec::new();
    render_into(node, &mut path, &mut out)?;
    Ok(out)
}

fn render_into<'a>(node: &'a Node, path: &mut Vec<&'a str>, out: &mut String) -> Result<()> {
    match node {
        Node::Object(map) => {
            for (key, child) in map {
                path.push(key);
                render_into(child, path, out)?;
                path.pop();
            }
        }
        Node::Strings(values) => {
            if values.is_empty() {
                return Ok(());
            }

            check_path(path)?;
            let key = path.join(".");
            for value in values {
                if value.contains(['\r', '\n']) {
                    return Err(unrenderable(&key, "value contains a line break"));
                }
                out.push_str(&key);
                out.push(' ');
                out.push_str(value);
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn check_path(path: &[&str]) -> Result<()> {
    let key = path.join(".");

    // A bare value at the root is written under the empty key.
    if matches!(path, [""]) {
        return Ok(());
    }
    if path.is_empty() {
        return Err(unrenderable(&key, "document root must be an object"));
    }

    if path.iter().any(|part| part.contains(['.', ' ', '\t', '\r', '\n'])) {
        return Err(unrenderable(&key, "key segment contains a separator"));
    }
    if path.first().is_some_and(|first| first.starts_with('#')) {
        return Err(unrenderable(&key, "key would start a comment"));
    }
    if path.last().is_some_and(|last| last.is_empty()) {
        return Err(unrenderable(&key, "key ends with an empty segment"));
    }
    Ok(())
}

fn unrenderable(path: &str, reason: &'static str) -> DumlError {
    DumlError::Unrenderable {
        path: path.to_string(),
        reason,
    }
}
