use std::fmt;

use serde::Serialize;

use super::node::Node;

/// A subtree displaced by a later, conflicting assignment.
///
/// `location` is the key path the node lived at when it was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LostNode {
    pub location: Vec<String>,
    pub node: Node,
}

impl LostNode {
    pub fn new<S: AsRef<str>>(location: &[S], node: Node) -> Self {
        Self {
            location: location.iter().map(|part| part.as_ref().to_string()).collect(),
            node,
        }
    }

    pub fn dotted_location(&self) -> String {
        self.location.join(".")
    }
}

impl fmt::Display for LostNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.location.join(", "), self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_location_then_node() {
        let lost = LostNode::new(&["a", "b"], Node::strings(["x"]));
        assert_eq!(lost.to_string(), "[a, b]: [x]");
        assert_eq!(lost.dotted_location(), "a.b");
    }
}
