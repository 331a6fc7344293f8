//! The document tree.
//!
//! Nodes follow the mdast JSON shape: a `type` tag, an ordered `children`
//! list for containers, a `value` for literals, and `identifier`/`label` for
//! footnotes. Any other field (positions, heading depth, link urls, ...) is
//! kept in `rest` so a tree survives a read/write cycle untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TEXT: &str = "text";
pub const PARAGRAPH: &str = "paragraph";
pub const ROOT: &str = "root";
pub const FOOTNOTE_REFERENCE: &str = "footnoteReference";
pub const FOOTNOTE_DEFINITION: &str = "footnoteDefinition";

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Node {
    fn new(node_type: &str) -> Node {
        Node {
            node_type: node_type.to_string(),
            children: None,
            value: None,
            identifier: None,
            label: None,
            rest: Map::new(),
        }
    }

    pub fn root(children: Vec<Node>) -> Node {
        Node {
            children: Some(children),
            ..Node::new(ROOT)
        }
    }

    pub fn text(value: &str) -> Node {
        Node {
            value: Some(value.to_string()),
            ..Node::new(TEXT)
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Node {
        Node {
            children: Some(children),
            ..Node::new(PARAGRAPH)
        }
    }

    /// A footnote reference whose identifier and label are both `id`.
    pub fn footnote_reference(id: &str) -> Node {
        Node {
            identifier: Some(id.to_string()),
            label: Some(id.to_string()),
            ..Node::new(FOOTNOTE_REFERENCE)
        }
    }

    pub fn footnote_definition(id: &str, children: Vec<Node>) -> Node {
        Node {
            children: Some(children),
            identifier: Some(id.to_string()),
            label: Some(id.to_string()),
            ..Node::new(FOOTNOTE_DEFINITION)
        }
    }

    pub fn is_text(&self) -> bool {
        self.node_type == TEXT
    }

    pub fn is_footnote_reference(&self) -> bool {
        self.node_type == FOOTNOTE_REFERENCE
    }

    pub fn is_footnote_definition(&self) -> bool {
        self.node_type == FOOTNOTE_DEFINITION
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Appends a child, turning a leaf into a container if needed.
    pub fn push_child(&mut self, child: Node) {
        self.children.get_or_insert_with(Vec::new).push(child);
    }
}
