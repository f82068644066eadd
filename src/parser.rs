use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::error::{DumlError, Result};
use crate::model::lost::LostNode;
use crate::model::node::{Node, NodeMap, key_parts};

const COMMENT: char = '#';
const SEPARATORS: [char; 2] = [' ', '\t'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Strip leading and trailing whitespace from every value.
    pub trim_values: bool,
}

/// The parsed document plus any subtrees that later lines overwrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    pub duml: Node,
    pub lost_nodes: Vec<LostNode>,
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.duml)?;
        if !self.lost_nodes.is_empty() {
            let lost: Vec<String> = self.lost_nodes.iter().map(ToString::to_string).collect();
            write!(f, " with lost nodes: [{}]", lost.join(", "))?;
        }
        Ok(())
    }
}

pub fn parse_str(text: &str, options: ParseOptions) -> Result<ParseResult> {
    Parser::new(options).run(text)
}

/// Parse everything `reader` yields. Invalid UTF-8 is replaced with U+FFFD.
pub fn parse_reader<R: Read>(mut reader: R, options: ParseOptions) -> Result<ParseResult> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_str(&decode(&bytes, "input"), options)
}

/// Parse a file. Invalid UTF-8 is replaced with U+FFFD.
pub fn parse_file(path: &Path, options: ParseOptions) -> Result<ParseResult> {
    let bytes = fs::read(path).map_err(|source| DumlError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let result = parse_str(&decode(&bytes, &path.display().to_string()), options)?;
    tracing::info!(
        path = %path.display(),
        keys = result.duml.map().map_or(0, NodeMap::len),
        lost = result.lost_nodes.len(),
        "parsed DUML file"
    );
    Ok(result)
}

fn decode<'a>(bytes: &'a [u8], source: &str) -> Cow<'a, str> {
    let text = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = text {
        tracing::warn!(source, "invalid UTF-8 replaced with U+FFFD");
    }
    text
}

struct Parser {
    options: ParseOptions,
    root: NodeMap,
    lost_nodes: Vec<LostNode>,
}

impl Parser {
    fn new(options: ParseOptions) -> Self {
        Self {
            options,
            root: NodeMap::new(),
            lost_nodes: Vec::new(),
        }
    }

    fn run(mut self, text: &str) -> Result<ParseResult> {
        // `\r` and `\n` each end a line; `\r\n` keeps one line number.
        for (idx, physical) in text.split('\n').enumerate() {
            let line_no = idx + 1;
            for line in physical.split('\r') {
                self.process_line(line, line_no)?;
            }
        }

        Ok(ParseResult {
            duml: Node::Object(self.root),
            lost_nodes: self.lost_nodes,
        })
    }

    fn process_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        if line.starts_with(COMMENT) {
            return Ok(());
        }

        let (key, value) = match line.split_once(SEPARATORS) {
            Some((key, value)) => (key, value),
            None if line.is_empty() => return Ok(()),
            None => (line, ""),
        };

        let parts = key_parts(key);
        if parts.is_empty() {
            return Err(DumlError::EmptyKeyPath { line: line_no });
        }

        let value = if self.options.trim_values {
            value.trim()
        } else {
            value
        };

        self.assign(&parts, value.to_string());
        Ok(())
    }

    fn assign(&mut self, parts: &[&str], value: String) {
        let Some((last, prefix)) = parts.split_last() else {
            return;
        };
        tracing::trace!(key = %parts.join("."), %value, "assign");

        let Self {
            root, lost_nodes, ..
        } = self;

        let mut map = root;
        for (idx, part) in prefix.iter().enumerate() {
            let child = map
                .entry((*part).to_string())
                .or_insert_with(Node::empty_object);
            let (displaced, child_map) = child.coerce_object();
            if let Some(old) = displaced {
                let lost = LostNode::new(&parts[..=idx], old);
                tracing::debug!(location = %lost.dotted_location(), "strings replaced by object");
                lost_nodes.push(lost);
            }
            map = child_map;
        }

        let leaf = map
            .entry((*last).to_string())
            .or_insert_with(Node::empty_strings);
        let (displaced, values) = leaf.coerce_strings();
        if let Some(old) = displaced {
            let lost = LostNode::new(parts, old);
            tracing::debug!(location = %lost.dotted_location(), "object replaced by strings");
            lost_nodes.push(lost);
        }
        values.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParseResult {
        parse_str(text, ParseOptions::default()).unwrap()
    }

    #[test]
    fn nested_keys_build_objects() {
        let result = parse("a.b.c d");
        assert_eq!(result.duml.get("a.b.c").and_then(Node::last), Some("d"));
        assert!(result.lost_nodes.is_empty());
    }

    #[test]
    fn repeated_keys_append() {
        let result = parse("k one\nk two\nk three");
        assert_eq!(
            result.duml.get("k").and_then(Node::values),
            Some(&["one".to_string(), "two".to_string(), "three".to_string()][..])
        );
    }

    #[test]
    fn value_keeps_everything_after_first_separator() {
        let result = parse("k \t spaced  value \t");
        assert_eq!(result.duml.get("k").and_then(Node::last), Some("\t spaced  value \t"));

        let result = parse("k\tv");
        assert_eq!(result.duml.get("k").and_then(Node::last), Some("v"));
    }

    #[test]
    fn trim_values_strips_whitespace() {
        let options = ParseOptions { trim_values: true };
        let result = parse_str("k \t spaced  value \t\nb    ", options).unwrap();
        assert_eq!(result.duml.get("k").and_then(Node::last), Some("spaced  value"));
        assert_eq!(result.duml.get("b").and_then(Node::last), Some(""));
    }

    #[test]
    fn bare_key_gets_empty_value() {
        let result = parse("flag\n");
        assert_eq!(result.duml.get("flag").and_then(Node::last), Some(""));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let result = parse("# note\n\nk v\n#k w\n");
        assert_eq!(result.duml.to_string(), "{k=[v]}");
    }

    #[test]
    fn hash_inside_line_is_not_a_comment() {
        let result = parse("k #v\nx#y z");
        assert_eq!(result.duml.get("k").and_then(Node::last), Some("#v"));
        assert_eq!(result.duml.get("x#y").and_then(Node::last), Some("z"));
    }

    #[test]
    fn all_line_endings_split_lines() {
        let result = parse("a 1\r\nb 2\rc 3\n");
        assert_eq!(result.duml.to_string(), "{a=[1], b=[2], c=[3]}");
    }

    #[test]
    fn leading_separator_assigns_empty_key() {
        let result = parse(" value");
        let root = result.duml.map().unwrap();
        assert_eq!(root.get("").and_then(Node::last), Some("value"));
    }

    #[test]
    fn trailing_dots_are_ignored() {
        let result = parse("a.b. v");
        assert_eq!(result.duml.to_string(), "{a={b=[v]}}");
    }

    #[test]
    fn dots_only_key_is_an_error() {
        let err = parse_str("ok v\n.. v", ParseOptions::default()).unwrap_err();
        assert!(matches!(err, DumlError::EmptyKeyPath { line: 2 }));
    }

    #[test]
    fn lone_carriage_return_keeps_line_number() {
        let err = parse_str("a 1\r.. x", ParseOptions::default()).unwrap_err();
        assert!(matches!(err, DumlError::EmptyKeyPath { line: 1 }));

        let err = parse_str("a 1\r\nb 2\r.. x", ParseOptions::default()).unwrap_err();
        assert!(matches!(err, DumlError::EmptyKeyPath { line: 2 }));
    }

    #[test]
    fn strings_displaced_by_object_are_lost() {
        let result = parse("a x\na.b y");
        assert_eq!(result.duml.to_string(), "{a={b=[y]}}");
        assert_eq!(
            result.lost_nodes,
            vec![LostNode::new(&["a"], Node::strings(["x"]))]
        );
    }

    #[test]
    fn object_displaced_by_strings_is_lost() {
        let result = parse("a.b.c x\na.b y");
        assert_eq!(result.duml.to_string(), "{a={b=[y]}}");

        let mut displaced = NodeMap::new();
        displaced.insert("c".to_string(), Node::strings(["x"]));
        assert_eq!(
            result.lost_nodes,
            vec![LostNode::new(&["a", "b"], Node::Object(displaced))]
        );
    }

    #[test]
    fn replaced_entry_keeps_its_position() {
        let result = parse("a 1\nb 2\na.c 3");
        let keys: Vec<&String> = result.duml.map().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn display_mentions_lost_nodes_only_when_present() {
        assert_eq!(parse("a x").to_string(), "{a=[x]}");
        assert_eq!(
            parse("a x\na.b y").to_string(),
            "{a={b=[y]}} with lost nodes: [[a]: [x]]"
        );
    }

    #[test]
    fn empty_input_is_an_empty_object() {
        let result = parse("");
        assert_eq!(result.duml, Node::empty_object());
    }

    #[test]
    fn parse_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.duml");
        let err = parse_file(&missing, ParseOptions::default()).unwrap_err();
        assert!(matches!(err, DumlError::Io { ref path, .. } if path == &missing));
    }

    #[test]
    fn parse_reader_reads_everything() {
        let result = parse_reader("a 1\nb 2".as_bytes(), ParseOptions::default()).unwrap();
        assert_eq!(result.duml.to_string(), "{a=[1], b=[2]}");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.duml");
        fs::write(&path, b"a ok\nb caf\xe9\n").unwrap();

        let result = parse_file(&path, ParseOptions::default()).unwrap();
        assert_eq!(result.duml.get("a").and_then(Node::last), Some("ok"));
        assert_eq!(result.duml.get("b").and_then(Node::last), Some("caf\u{FFFD}"));

        let result = parse_reader(&b"b caf\xe9"[..], ParseOptions::default()).unwrap();
        assert_eq!(result.duml.to_string(), "{b=[caf\u{FFFD}]}");
    }
}
