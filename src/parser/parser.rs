use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::parser::types::*;

/// Turns serialized or hand-built trees into a [`Document`] with stable ids.
pub struct DocumentParser;

impl DocumentParser {
    /// Parses a JSON node tree. The top level may be a single node or an
    /// array of sibling nodes.
    ///
    /// Nesting is not limited here; subtrees past the render depth ceiling
    /// are dropped by the renderer instead.
    pub fn parse_json(json: &str) -> Result<Document> {
        let input = Self::read_input(json).context("Failed to parse document tree JSON")?;
        let root = match input {
            RawInput::One(raw) => Self::convert(raw),
            RawInput::Many(raws) => Node::new(NodeKind::Document)
                .with_children(raws.into_iter().map(Self::convert)),
        };
        Ok(Self::from_node(root))
    }

    fn read_input(json: &str) -> serde_json::Result<RawInput> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        deserializer.disable_recursion_limit();
        let input = RawInput::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
        deserializer.end()?;
        Ok(input)
    }

    pub fn from_raw(raw: RawNode) -> Document {
        Self::from_node(Self::convert(raw))
    }

    /// Wraps `root` in a document node when needed and assigns ids in
    /// pre-order, starting at zero for the document itself.
    pub fn from_node(root: Node) -> Document {
        let mut root = if root.kind == NodeKind::Document {
            root
        } else {
            Node::new(NodeKind::Document).with_child(root)
        };

        let mut next = 0;
        assign_ids(&mut root, &mut next);
        debug!(nodes = next, "document built");

        Document {
            id: DocumentId::next(),
            root,
            node_count: next,
        }
    }

    fn convert(raw: RawNode) -> Node {
        match raw {
            RawNode::Text(text) => Node::text(text),
            RawNode::Element(element) => {
                let mut node = Node::element(&element.kind);
                node.text = element.text;

                match element.attrs {
                    RawAttributes::List(pairs) => {
                        for (name, value) in pairs {
                            node.push_attr(&name, value);
                        }
                    }
                    RawAttributes::Map(map) => {
                        for (name, value) in map {
                            node.push_attr(&name, attribute_string(value));
                        }
                    }
                }

                node.children = element.children.into_iter().map(Self::convert).collect();
                node
            }
        }
    }
}

fn attribute_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn assign_ids(node: &mut Node, next: &mut usize) {
    node.id = NodeId(*next);
    *next += 1;
    for child in &mut node.children {
        assign_ids(child, next);
    }
}
