//! Host document-tree abstraction.
//!
//! The suggestion engine never talks to a concrete page. Every read goes
//! through [`DocumentTree`] and every mutation through [`DocumentMut`], so the
//! field heuristics and the suggestion state machine can run against a real
//! browser binding or an in-memory tree alike.

use serde::{Deserialize, Serialize};

use crate::overlay::Overlay;

/// Opaque handle to a node (element or text) owned by the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Structural kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
}

/// Viewport-relative bounding box of a rendered element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// The subset of a field's computed style that the ghost overlay mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Shorthand font declaration (for example `16px monospace`).
    pub font: String,
    /// Shorthand padding declaration.
    pub padding: String,
    /// Shorthand border declaration.
    pub border: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "16px monospace".to_string(),
            padding: "0px".to_string(),
            border: "0px none".to_string(),
        }
    }
}

/// Read access to the host document.
///
/// Implementations must be cheap to query; the heuristics call these methods
/// synchronously and repeatedly while walking the tree.
pub trait DocumentTree {
    /// The document title.
    fn title(&self) -> String;

    /// Heading elements of levels 1 through 3, in document order.
    fn headings(&self) -> Vec<NodeId>;

    /// Content of the `description` meta element, if the page declares one.
    fn meta_description(&self) -> Option<String>;

    /// Kind of `node`, or `None` for a dangling handle.
    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Upper-case tag name of an element node; `None` for text nodes.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    /// Attribute value of an element node.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Rendered text of the node and its descendants, falling back to the raw
    /// text content when nothing is rendered.
    fn rendered_text(&self, node: NodeId) -> String;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Previous sibling of any kind (element or text).
    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Next sibling of any kind (element or text).
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Number of direct element children (text children are not counted).
    fn element_child_count(&self, node: NodeId) -> usize;

    /// The `label` element whose `for` attribute equals `id`.
    fn label_for(&self, id: &str) -> Option<NodeId>;

    /// Current text value of a text-entry field.
    fn field_value(&self, field: NodeId) -> String;

    fn bounding_rect(&self, field: NodeId) -> Rect;

    fn computed_style(&self, field: NodeId) -> TextStyle;

    /// Horizontal and vertical scroll offset of the page.
    fn scroll_offset(&self) -> (f64, f64);

    /// Rendered width of `text` in the given font, in CSS pixels.
    fn measure_text(&self, text: &str, font: &str) -> f64;

    /// The node itself if it is a `label`, otherwise its nearest `label` ancestor.
    fn closest_label(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.tag_name(candidate).as_deref() == Some("LABEL") {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// Whether `node` is an `input` or `textarea` element.
    fn is_text_entry(&self, node: NodeId) -> bool {
        matches!(self.tag_name(node).as_deref(), Some("INPUT") | Some("TEXTAREA"))
    }
}

/// Write access to the host document.
pub trait DocumentMut: DocumentTree {
    fn set_field_value(&mut self, field: NodeId, value: &str);

    /// Move keyboard focus to `field`.
    fn focus(&mut self, field: NodeId);

    /// Insert a decoration node at the end of the document body and return its handle.
    fn append_overlay(&mut self, overlay: Overlay) -> NodeId;

    /// Detach a node from the document. Returns `false` when the node was not attached.
    fn remove_node(&mut self, node: NodeId) -> bool;
}
