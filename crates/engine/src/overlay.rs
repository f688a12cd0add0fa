//! Ghost-text overlay rendering.

use ghostfill_types::{DocumentMut, DocumentTree, GHOST_TEXT_CLASS, NodeId, Overlay};
use tracing::debug;

/// Foreground color of ghost text.
pub const GHOST_TEXT_COLOR: &str = "#888";

/// Handle to the overlay currently attached to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedOverlay {
    pub node: NodeId,
    pub field: NodeId,
}

/// Owns the single ghost-text overlay of a page.
///
/// At most one overlay is attached at a time: [`show`](Self::show) always
/// removes the previous one before inserting.
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    current: Option<RenderedOverlay>,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `text` right after the current content of `field`.
    pub fn show<D: DocumentMut + ?Sized>(&mut self, doc: &mut D, field: NodeId, text: &str) -> RenderedOverlay {
        self.hide(doc);
        let node = doc.append_overlay(Self::layout(doc, field, text));
        let rendered = RenderedOverlay { node, field };
        debug!(field = field.0, overlay = node.0, "ghost text shown");
        self.current = Some(rendered);
        rendered
    }

    /// Remove the overlay if one is attached. Returns whether anything was removed.
    pub fn hide<D: DocumentMut + ?Sized>(&mut self, doc: &mut D) -> bool {
        let Some(rendered) = self.current.take() else {
            return false;
        };
        doc.remove_node(rendered.node);
        debug!(field = rendered.field.0, overlay = rendered.node.0, "ghost text removed");
        true
    }

    pub fn current(&self) -> Option<RenderedOverlay> {
        self.current
    }

    /// Position and style of an overlay for `text` on `field`.
    ///
    /// The overlay copies the field's font, padding and border so the ghost
    /// text lines up with the typed text. It sits at the field's top edge,
    /// offset horizontally by the measured width of the current value, in page
    /// coordinates.
    pub fn layout<D: DocumentTree + ?Sized>(doc: &D, field: NodeId, text: &str) -> Overlay {
        let style = doc.computed_style(field);
        let rect = doc.bounding_rect(field);
        let (scroll_x, scroll_y) = doc.scroll_offset();
        let typed_width = doc.measure_text(&doc.field_value(field), &style.font);

        Overlay {
            text: text.to_string(),
            left: rect.left + typed_width + scroll_x,
            top: rect.top + scroll_y,
            font: style.font,
            padding: style.padding,
            border: style.border,
            color: GHOST_TEXT_COLOR.to_string(),
            class_name: GHOST_TEXT_CLASS.to_string(),
            pointer_events: false,
            preserve_whitespace: true,
        }
    }
}
