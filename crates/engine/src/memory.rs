//! In-memory document tree.
//!
//! [`MemoryDocument`] implements the host traits over a simple node arena. It
//! backs hosts that have no live page (replaying captured pages, headless
//! embedding) and the engine's own test suites.

use ghostfill_types::{DocumentMut, DocumentTree, NodeId, NodeKind, Overlay, Rect, TextStyle};
use indexmap::IndexMap;
use unicode_width::UnicodeWidthStr;

/// Width of one character cell used by [`MemoryDocument::measure_text`].
pub const DEFAULT_CHAR_WIDTH: f64 = 8.0;

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    tag: Option<String>,
    text: String,
    attributes: IndexMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: String,
    rect: Rect,
    style: TextStyle,
    overlay: Option<Overlay>,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: Some(tag.to_ascii_uppercase()),
            text: String::new(),
            attributes: IndexMap::new(),
            parent: None,
            children: Vec::new(),
            value: String::new(),
            rect: Rect::default(),
            style: TextStyle::default(),
            overlay: None,
        }
    }

    fn text(content: &str) -> Self {
        Self {
            kind: NodeKind::Text,
            tag: None,
            text: content.to_string(),
            ..Self::element("#text")
        }
    }
}

/// Arena-backed document with a `body` root.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    body: NodeId,
    title: String,
    meta_description: Option<String>,
    focused: Option<NodeId>,
    scroll: (f64, f64),
    char_width: f64,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::element("body")],
            body: NodeId(0),
            title: String::new(),
            meta_description: None,
            focused: None,
            scroll: (0.0, 0.0),
            char_width: DEFAULT_CHAR_WIDTH,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_meta_description(&mut self, description: impl Into<String>) {
        self.meta_description = Some(description.into());
    }

    pub fn set_scroll_offset(&mut self, x: f64, y: f64) {
        self.scroll = (x, y);
    }

    pub fn set_char_width(&mut self, width: f64) {
        self.char_width = width;
    }

    /// Create an element and append it to `parent`.
    pub fn element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.push(NodeData::element(tag));
        self.append_child(parent, id);
        id
    }

    /// Create a text node and append it to `parent`.
    pub fn text(&mut self, parent: NodeId, content: &str) -> NodeId {
        let id = self.push(NodeData::text(content));
        self.append_child(parent, id);
        id
    }

    /// Create an `input` element carrying the given attributes.
    pub fn input(&mut self, parent: NodeId, attributes: &[(&str, &str)]) -> NodeId {
        let id = self.element(parent, "input");
        for (name, value) in attributes {
            self.set_attribute(id, name, value);
        }
        id
    }

    /// Move `child` under `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.rect = rect;
        }
    }

    pub fn set_style(&mut self, node: NodeId, style: TextStyle) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.style = style;
        }
    }

    /// Overlays currently attached to the document, in insertion order.
    pub fn overlays(&self) -> Vec<(NodeId, &Overlay)> {
        self.descendants(self.body)
            .into_iter()
            .filter_map(|id| self.nodes[id.0].overlay.as_ref().map(|overlay| (id, overlay)))
            .collect()
    }

    /// The node that last received focus through [`DocumentMut::focus`].
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Whether `node` is reachable from the body.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == self.body {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    fn detach(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.nodes.get(node.0).and_then(|data| data.parent) else {
            return false;
        };
        if let Some(parent_data) = self.nodes.get_mut(parent.0) {
            parent_data.children.retain(|child| *child != node);
        }
        self.nodes[node.0].parent = None;
        true
    }

    /// Pre-order traversal below `root` (excluding `root`).
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut ordered = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            ordered.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        ordered
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node.0).map(|data| data.children.as_slice()).unwrap_or_default()
    }

    fn sibling_at(&self, node: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|candidate| *candidate == node)?;
        let target = index.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }
}

impl DocumentTree for MemoryDocument {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn headings(&self) -> Vec<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|id| matches!(self.nodes[id.0].tag.as_deref(), Some("H1") | Some("H2") | Some("H3")))
            .collect()
    }

    fn meta_description(&self) -> Option<String> {
        self.meta_description.clone()
    }

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node.0).map(|data| data.kind)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.nodes.get(node.0).and_then(|data| data.tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get(node.0).and_then(|data| data.attributes.get(name).cloned())
    }

    fn rendered_text(&self, node: NodeId) -> String {
        let Some(data) = self.nodes.get(node.0) else {
            return String::new();
        };
        match (data.kind, data.overlay.as_ref()) {
            (NodeKind::Text, _) => data.text.clone(),
            (NodeKind::Element, Some(overlay)) => overlay.text.clone(),
            (NodeKind::Element, None) => self
                .descendants(node)
                .into_iter()
                .filter(|id| self.nodes[id.0].kind == NodeKind::Text)
                .map(|id| self.nodes[id.0].text.as_str())
                .collect(),
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|data| data.parent)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling_at(node, -1)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling_at(node, 1)
    }

    fn element_child_count(&self, node: NodeId) -> usize {
        self.children(node)
            .iter()
            .filter(|child| self.nodes[child.0].kind == NodeKind::Element)
            .count()
    }

    fn label_for(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body).into_iter().find(|node| {
            let data = &self.nodes[node.0];
            data.tag.as_deref() == Some("LABEL") && data.attributes.get("for").map(String::as_str) == Some(id)
        })
    }

    fn field_value(&self, field: NodeId) -> String {
        self.nodes.get(field.0).map(|data| data.value.clone()).unwrap_or_default()
    }

    fn bounding_rect(&self, field: NodeId) -> Rect {
        self.nodes.get(field.0).map(|data| data.rect).unwrap_or_default()
    }

    fn computed_style(&self, field: NodeId) -> TextStyle {
        self.nodes.get(field.0).map(|data| data.style.clone()).unwrap_or_default()
    }

    fn scroll_offset(&self) -> (f64, f64) {
        self.scroll
    }

    fn measure_text(&self, text: &str, _font: &str) -> f64 {
        text.width() as f64 * self.char_width
    }
}

impl DocumentMut for MemoryDocument {
    fn set_field_value(&mut self, field: NodeId, value: &str) {
        if let Some(data) = self.nodes.get_mut(field.0) {
            data.value = value.to_string();
        }
    }

    fn focus(&mut self, field: NodeId) {
        self.focused = Some(field);
    }

    fn append_overlay(&mut self, overlay: Overlay) -> NodeId {
        let mut data = NodeData::element("span");
        data.attributes.insert("class".to_string(), overlay.class_name.clone());
        data.overlay = Some(overlay);
        let id = self.push(data);
        self.append_child(self.body, id);
        id
    }

    fn remove_node(&mut self, node: NodeId) -> bool {
        self.detach(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siblings_include_text_nodes() {
        let mut doc = MemoryDocument::new();
        let form = doc.element(doc.body(), "form");
        let label = doc.text(form, "Email");
        let input = doc.input(form, &[]);
        let hint = doc.text(form, "We never share it");

        assert_eq!(doc.previous_sibling(input), Some(label));
        assert_eq!(doc.next_sibling(input), Some(hint));
        assert_eq!(doc.previous_sibling(label), None);
        assert_eq!(doc.element_child_count(form), 1);
    }

    #[test]
    fn rendered_text_concatenates_descendants() {
        let mut doc = MemoryDocument::new();
        let section = doc.element(doc.body(), "div");
        let span = doc.element(section, "span");
        doc.text(span, "First ");
        doc.text(section, "name");
        assert_eq!(doc.rendered_text(section), "First name");
    }

    #[test]
    fn headings_in_document_order() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let h2 = doc.element(body, "h2");
        let article = doc.element(body, "article");
        let h1 = doc.element(article, "h1");
        doc.element(body, "h4");
        assert_eq!(doc.headings(), vec![h2, h1]);
    }

    #[test]
    fn overlays_attach_and_detach() {
        let mut doc = MemoryDocument::new();
        let overlay = Overlay {
            text: "ghost".into(),
            left: 0.0,
            top: 0.0,
            font: String::new(),
            padding: String::new(),
            border: String::new(),
            color: "#888".into(),
            class_name: "ghost-text".into(),
            pointer_events: false,
            preserve_whitespace: true,
        };
        let id = doc.append_overlay(overlay);
        assert_eq!(doc.overlays().len(), 1);
        assert!(doc.remove_node(id));
        assert!(!doc.remove_node(id));
        assert!(doc.overlays().is_empty());
        assert!(!doc.is_attached(id));
    }

    #[test]
    fn label_for_matches_attribute() {
        let mut doc = MemoryDocument::new();
        let label = doc.element(doc.body(), "label");
        doc.set_attribute(label, "for", "email");
        assert_eq!(doc.label_for("email"), Some(label));
        assert_eq!(doc.label_for("phone"), None);
    }

    #[test]
    fn measure_uses_cell_width() {
        let doc = MemoryDocument::new();
        assert_eq!(doc.measure_text("abcd", "16px monospace"), 32.0);
    }
}
