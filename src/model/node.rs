use std::fmt;
use std::mem;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered key/value contents of an object node.
pub type NodeMap = IndexMap<String, Node>;

/// A node in a parsed DUML document.
///
/// Every document is a tree of objects whose leaves are ordered lists of
/// strings. Serializes to JSON as nested objects with string-array leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Object(NodeMap),
    Strings(Vec<String>),
}

impl Node {
    pub fn empty_object() -> Self {
        Node::Object(NodeMap::new())
    }

    pub fn empty_strings() -> Self {
        Node::Strings(Vec::new())
    }

    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Node::Strings(values.into_iter().map(Into::into).collect())
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Node::Object(_))
    }

    pub fn is_strings(&self) -> bool {
        matches!(self, Node::Strings(_))
    }

    /// Look up a descendant by dotted key, so `get("a.b")` walks `a` then `b`.
    ///
    /// Lookups through a strings node, or for a key with no segments, yield
    /// `None`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        let parts = key_parts(key);
        if parts.is_empty() {
            return None;
        }

        parts.into_iter().try_fold(self, |node, part| match node {
            Node::Object(map) => map.get(part),
            Node::Strings(_) => None,
        })
    }

    /// Look up a descendant by several keys, each of which may be dotted.
    pub fn get_path<S: AsRef<str>>(&self, keys: &[S]) -> Option<&Node> {
        if keys.is_empty() {
            return None;
        }

        keys.iter().try_fold(self, |node, key| node.get(key.as_ref()))
    }

    pub fn values(&self) -> Option<&[String]> {
        match self {
            Node::Strings(values) => Some(values),
            Node::Object(_) => None,
        }
    }

    /// The most recently assigned value of a strings node.
    pub fn last(&self) -> Option<&str> {
        self.values()?.last().map(String::as_str)
    }

    pub fn map(&self) -> Option<&NodeMap> {
        match self {
            Node::Object(map) => Some(map),
            Node::Strings(_) => None,
        }
    }

    pub fn map_mut(&mut self) -> Option<&mut NodeMap> {
        match self {
            Node::Object(map) => Some(map),
            Node::Strings(_) => None,
        }
    }

    /// Turn this node into an object, handing back whatever it held before
    /// if that was a strings node.
    pub(crate) fn coerce_object(&mut self) -> (Option<Node>, &mut NodeMap) {
        let displaced = match self {
            Node::Object(_) => None,
            Node::Strings(_) => Some(mem::replace(self, Node::empty_object())),
        };

        match self {
            Node::Object(map) => (displaced, map),
            Node::Strings(_) => unreachable!("strings node replaced above"),
        }
    }

    /// Turn this node into a strings node, handing back the displaced
    /// object if there was one.
    pub(crate) fn coerce_strings(&mut self) -> (Option<Node>, &mut Vec<String>) {
        let displaced = match self {
            Node::Strings(_) => None,
            Node::Object(_) => Some(mem::replace(self, Node::empty_strings())),
        };

        match self {
            Node::Strings(values) => (displaced, values),
            Node::Object(_) => unreachable!("object node replaced above"),
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::empty_object()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Object(map) => {
                f.write_str("{")?;
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
            Node::Strings(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// Split a dotted key into its path segments.
///
/// Trailing empty segments are dropped (`a.b.` is `a.b`), inner and leading
/// ones are kept (`a..b` is `a`, ``, `b`). The empty key is a single empty
/// segment; a key made only of dots has none.
pub fn key_parts(key: &str) -> Vec<&str> {
    if key.is_empty() {
        return vec![""];
    }

    let mut parts: Vec<&str> = key.split('.').collect();
    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    parts
}
