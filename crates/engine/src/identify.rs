//! Field identification.
//!
//! A field's name is resolved through an ordered chain of cheap structural
//! heuristics. Only when all of them come up empty is the completion service
//! asked to guess, and any failure there degrades to [`InferredName::unknown`].

use ghostfill_api::CompletionService;
use ghostfill_types::{ContextStrings, DocumentTree, InferredName, NodeId, NodeKind};
use tracing::{debug, warn};

use crate::context::ContextExtractor;
use crate::settings::DEFAULT_ANCESTOR_CHILD_LIMIT;

/// Attributes consulted first, in priority order.
pub const DIRECT_ATTRIBUTES: [&str; 4] = ["name", "id", "aria-label", "placeholder"];

/// Element tags whose text may caption the field that follows them.
pub const SIBLING_TAGS: [&str; 4] = ["LABEL", "SPAN", "DIV", "P"];

/// Which heuristic produced a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Attribute,
    Label,
    PrecedingSibling,
    Ancestor,
}

/// Outcome of the synchronous part of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Named(InferredName, NameSource),
    /// Every structural heuristic missed; the prompt asks the completion
    /// service for the field's purpose.
    NeedsInference { prompt: String },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldIdentifier {
    context: ContextExtractor,
    ancestor_child_limit: usize,
}

impl Default for FieldIdentifier {
    fn default() -> Self {
        Self::new(ContextExtractor::default(), DEFAULT_ANCESTOR_CHILD_LIMIT)
    }
}

impl FieldIdentifier {
    pub fn new(context: ContextExtractor, ancestor_child_limit: usize) -> Self {
        Self {
            context,
            ancestor_child_limit,
        }
    }

    /// Run the structural heuristics against the current document.
    ///
    /// Never suspends and never touches the network. The first step that
    /// yields a non-empty name wins.
    pub fn resolve<D: DocumentTree + ?Sized>(&self, doc: &D, field: NodeId) -> Resolution {
        let steps: [(NameSource, fn(&Self, &D, NodeId) -> Option<String>); 4] = [
            (NameSource::Attribute, Self::from_attributes),
            (NameSource::Label, Self::from_label),
            (NameSource::PrecedingSibling, Self::from_preceding_sibling),
            (NameSource::Ancestor, Self::from_ancestors),
        ];
        for (source, step) in steps {
            if let Some(name) = step(self, doc, field).and_then(InferredName::new) {
                debug!(field = field.0, ?source, name = %name, "field name resolved");
                return Resolution::Named(name, source);
            }
        }

        let context = self.context.context_strings(doc, field);
        Resolution::NeedsInference {
            prompt: inference_prompt(&context),
        }
    }

    /// Resolve a field's name, asking `completions` when the heuristics miss.
    pub async fn identify<D, C>(&self, doc: &D, completions: &C, field: NodeId) -> InferredName
    where
        D: DocumentTree + ?Sized,
        C: CompletionService + ?Sized,
    {
        match self.resolve(doc, field) {
            Resolution::Named(name, _) => name,
            Resolution::NeedsInference { prompt } => infer_field_name(completions, &prompt).await,
        }
    }

    fn from_attributes<D: DocumentTree + ?Sized>(&self, doc: &D, field: NodeId) -> Option<String> {
        DIRECT_ATTRIBUTES
            .iter()
            .filter_map(|attribute| doc.attribute(field, attribute))
            .find(|value| !value.is_empty())
    }

    fn from_label<D: DocumentTree + ?Sized>(&self, doc: &D, field: NodeId) -> Option<String> {
        let label = doc
            .closest_label(field)
            .or_else(|| doc.attribute(field, "id").and_then(|id| doc.label_for(&id)))?;
        Some(doc.rendered_text(label).trim().to_string())
    }

    fn from_preceding_sibling<D: DocumentTree + ?Sized>(&self, doc: &D, field: NodeId) -> Option<String> {
        let mut cursor = doc.previous_sibling(field);
        while let Some(node) = cursor {
            let captions = match doc.node_kind(node) {
                Some(NodeKind::Text) => true,
                Some(NodeKind::Element) => doc
                    .tag_name(node)
                    .is_some_and(|tag| SIBLING_TAGS.contains(&tag.as_str())),
                None => false,
            };
            if captions {
                let text = doc.rendered_text(node);
                let text = text.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
            cursor = doc.previous_sibling(node);
        }
        None
    }

    fn from_ancestors<D: DocumentTree + ?Sized>(&self, doc: &D, field: NodeId) -> Option<String> {
        let mut cursor = doc.parent(field);
        while let Some(ancestor) = cursor {
            let text = doc.rendered_text(ancestor);
            let text = text.trim();
            if !text.is_empty() && doc.element_child_count(ancestor) < self.ancestor_child_limit {
                return Some(text.to_string());
            }
            cursor = doc.parent(ancestor);
        }
        None
    }
}

/// Prompt asking the completion service to name a field from its context.
pub fn inference_prompt(context: &ContextStrings) -> String {
    format!(
        "Given the following context about a web page and the text near a form field, determine the most likely \
         purpose or name of the form field. Respond with only the field name, nothing else.\n\nPage context: {}\n\
         Nearby text: {}\n\nField name:",
        context.page_context, context.nearby_text
    )
}

/// Ask `completions` to name a field.
///
/// Returns the first line of the trimmed response. Failures and empty answers
/// yield [`InferredName::unknown`]; nothing propagates to the caller.
pub async fn infer_field_name<C: CompletionService + ?Sized>(completions: &C, prompt: &str) -> InferredName {
    match completions.complete(prompt).await {
        Ok(response) => {
            let first_line = response.trim().lines().next().unwrap_or_default().trim();
            InferredName::new(first_line).unwrap_or_else(InferredName::unknown)
        }
        Err(error) => {
            warn!(error = %error, "field name inference failed");
            InferredName::unknown()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use ghostfill_api::CompletionError;

    use super::*;
    use crate::memory::MemoryDocument;

    struct Scripted {
        reply: Result<&'static str, &'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(reply: Result<&'static str, &'static str>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionService for Scripted {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .map(str::to_string)
                .map_err(|message| CompletionError::Transport(message.to_string()))
        }
    }

    fn named(resolution: Resolution) -> (String, NameSource) {
        match resolution {
            Resolution::Named(name, source) => (name.into_string(), source),
            other => panic!("expected a name, got {other:?}"),
        }
    }

    #[test]
    fn attributes_checked_in_priority_order() {
        let mut doc = MemoryDocument::new();
        let field = doc.input(doc.body(), &[("placeholder", "Your email"), ("id", "email-input"), ("name", "")]);
        let (name, source) = named(FieldIdentifier::default().resolve(&doc, field));
        assert_eq!(name, "email-input");
        assert_eq!(source, NameSource::Attribute);

        let aria = doc.input(doc.body(), &[("aria-label", "Phone"), ("placeholder", "555")]);
        assert_eq!(named(FieldIdentifier::default().resolve(&doc, aria)).0, "Phone");
    }

    #[test]
    fn enclosing_label_names_field() {
        let mut doc = MemoryDocument::new();
        let label = doc.element(doc.body(), "label");
        doc.text(label, "  Favourite colour ");
        let field = doc.input(label, &[]);
        assert_eq!(
            named(FieldIdentifier::default().resolve(&doc, field)),
            ("Favourite colour".to_string(), NameSource::Label)
        );
    }

    #[test]
    fn label_for_empty_id_is_used() {
        let mut doc = MemoryDocument::new();
        let label = doc.element(doc.body(), "label");
        doc.set_attribute(label, "for", "");
        doc.text(label, "Nickname");
        let form = doc.element(doc.body(), "form");
        let field = doc.input(form, &[("id", "")]);
        assert_eq!(named(FieldIdentifier::default().resolve(&doc, field)).1, NameSource::Label);
    }

    #[test]
    fn empty_label_falls_through() {
        let mut doc = MemoryDocument::new();
        let wrapper = doc.element(doc.body(), "div");
        let label = doc.element(wrapper, "label");
        let field = doc.input(label, &[]);
        doc.text(wrapper, "Company");
        let (name, source) = named(FieldIdentifier::default().resolve(&doc, field));
        assert_eq!(name, "Company");
        assert_eq!(source, NameSource::Ancestor);
    }

    #[test]
    fn preceding_sibling_skips_blank_and_unlisted_nodes() {
        let mut doc = MemoryDocument::new();
        let form = doc.element(doc.body(), "form");
        for _ in 0..5 {
            doc.element(form, "br");
        }
        let caption = doc.element(form, "span");
        doc.text(caption, "Street address");
        let heading = doc.element(form, "h4");
        doc.text(heading, "Ignored heading");
        doc.text(form, "   ");
        let field = doc.input(form, &[]);

        assert_eq!(
            named(FieldIdentifier::default().resolve(&doc, field)),
            ("Street address".to_string(), NameSource::PrecedingSibling)
        );
    }

    #[test]
    fn ancestor_with_many_children_is_skipped() {
        let mut doc = MemoryDocument::new();
        let outer = doc.element(doc.body(), "section");
        doc.text(outer, "Billing");
        let crowded = doc.element(outer, "div");
        let field = doc.input(crowded, &[]);
        for _ in 0..4 {
            let cell = doc.element(crowded, "span");
            doc.text(cell, "x");
        }

        let (name, source) = named(FieldIdentifier::default().resolve(&doc, field));
        assert_eq!(source, NameSource::Ancestor);
        assert_eq!(name, "Billingxxxx");
    }

    #[test]
    fn structural_miss_requests_inference() {
        let mut doc = MemoryDocument::new();
        doc.set_title("Pet Registration");
        let form = doc.element(doc.body(), "form");
        let field = doc.input(form, &[]);
        match FieldIdentifier::default().resolve(&doc, field) {
            Resolution::NeedsInference { prompt } => {
                assert!(prompt.contains("Page context: pet registration  "));
                assert!(prompt.ends_with("Nearby text: \n\nField name:"));
            }
            other => panic!("expected inference, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn attribute_name_skips_network() {
        let mut doc = MemoryDocument::new();
        let field = doc.input(doc.body(), &[("name", "email")]);
        let completions = Scripted::new(Ok("should not be asked"));
        let name = FieldIdentifier::default().identify(&doc, &completions, field).await;
        assert_eq!(name.as_str(), "email");
        assert_eq!(completions.calls(), 0);
    }

    #[tokio::test]
    async fn inference_uses_first_line_of_reply() {
        let mut doc = MemoryDocument::new();
        let field = doc.input(doc.body(), &[]);
        let completions = Scripted::new(Ok("  Date of birth\nextra commentary"));
        let name = FieldIdentifier::default().identify(&doc, &completions, field).await;
        assert_eq!(name.as_str(), "Date of birth");
        assert_eq!(completions.calls(), 1);
    }

    #[tokio::test]
    async fn inference_failure_yields_sentinel() {
        let completions = Scripted::new(Err("connection reset"));
        assert_eq!(infer_field_name(&completions, "prompt").await.as_str(), "unknown field");

        let blank = Scripted::new(Ok("   "));
        assert_eq!(infer_field_name(&blank, "prompt").await, InferredName::unknown());
    }
}
