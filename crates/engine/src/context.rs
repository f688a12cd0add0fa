//! Page-level and field-local context used to prompt for a field's purpose.
//!
//! Both strings are rebuilt on every call from the live document; nothing is
//! cached between requests.

use ghostfill_types::{ContextStrings, DocumentTree, NodeId, NodeKind};
use ghostfill_util::remove_stop_words;

use crate::settings::DEFAULT_NEARBY_TEXT_BUDGET;

/// Reads normalized context strings out of a [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextExtractor {
    nearby_text_budget: usize,
}

impl Default for ContextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_NEARBY_TEXT_BUDGET)
    }
}

impl ContextExtractor {
    /// `nearby_text_budget` is the number of characters gathered on each side
    /// of a field before the walk stops.
    pub fn new(nearby_text_budget: usize) -> Self {
        Self { nearby_text_budget }
    }

    /// Title, h1-h3 text and meta description, joined by spaces and filtered.
    pub fn page_context<D: DocumentTree + ?Sized>(&self, doc: &D) -> String {
        let headings = doc
            .headings()
            .into_iter()
            .map(|heading| doc.rendered_text(heading))
            .collect::<Vec<_>>()
            .join(" ");
        let description = doc.meta_description().unwrap_or_default();
        remove_stop_words(&format!("{} {} {}", doc.title(), headings, description))
    }

    /// Text nodes around `field`, filtered.
    ///
    /// Walks backwards through previous siblings, climbing to the parent when
    /// a level runs out, prepending every text node seen. The forward walk
    /// mirrors it through next siblings. Each direction stops once its buffer
    /// holds the budget's worth of characters or the root is passed.
    pub fn nearby_text<D: DocumentTree + ?Sized>(&self, doc: &D, field: NodeId) -> String {
        let mut before = String::new();
        let mut cursor = Some(field);
        while let Some(node) = cursor {
            if before.chars().count() >= self.nearby_text_budget {
                break;
            }
            if doc.node_kind(node) == Some(NodeKind::Text) {
                before = format!("{} {}", doc.rendered_text(node).trim(), before);
            }
            cursor = doc.previous_sibling(node).or_else(|| doc.parent(node));
        }

        let mut after = String::new();
        let mut cursor = Some(field);
        while let Some(node) = cursor {
            if after.chars().count() >= self.nearby_text_budget {
                break;
            }
            if doc.node_kind(node) == Some(NodeKind::Text) {
                after.push(' ');
                after.push_str(doc.rendered_text(node).trim());
            }
            cursor = doc.next_sibling(node).or_else(|| doc.parent(node));
        }

        remove_stop_words(format!("{before}{after}").trim())
    }

    pub fn context_strings<D: DocumentTree + ?Sized>(&self, doc: &D, field: NodeId) -> ContextStrings {
        ContextStrings {
            page_context: self.page_context(doc),
            nearby_text: self.nearby_text(doc, field),
        }
    }
}
