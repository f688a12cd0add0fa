//! Suggestion lifecycle state machine.
//!
//! The controller is synchronous: page events and resolved requests go in,
//! document mutations happen in place, and the asynchronous work still to be
//! done comes back out as [`Effect`]s. The runtime executes the effects and
//! feeds their results back as [`Msg`]s, tagged with the generation of the
//! field session that asked for them so late answers can be recognised and
//! dropped.

use std::collections::HashMap;
use std::sync::Arc;

use ghostfill_api::CompletionError;
use ghostfill_types::{DocumentMut, EventDisposition, InferredName, Key, NodeId, PageEvent, Profile, Suggestion};
use ghostfill_util::last_sentence_fragment;
use tracing::{debug, info, warn};

use crate::context::ContextExtractor;
use crate::identify::{FieldIdentifier, Resolution};
use crate::overlay::OverlayRenderer;
use crate::settings::SuggestionSettings;

/// Results flowing back into the controller.
#[derive(Debug)]
pub enum Msg {
    /// The quiet period after the last keystroke in `field` elapsed.
    DoneTyping(NodeId),
    FieldNameResolved {
        field: NodeId,
        generation: u64,
        name: InferredName,
    },
    SuggestionResolved {
        field: NodeId,
        generation: u64,
        outcome: Result<String, CompletionError>,
    },
}

/// Work the controller needs done outside the synchronous update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the completion service to name `field`; answer with [`Msg::FieldNameResolved`].
    InferFieldName { field: NodeId, generation: u64, prompt: String },
    /// Ask the completion service for a suggestion; answer with [`Msg::SuggestionResolved`].
    RequestSuggestion { field: NodeId, generation: u64, prompt: String },
    /// Restart the typing quiet period for `field`; answer with [`Msg::DoneTyping`].
    ScheduleDoneTyping(NodeId),
}

/// Outcome of handling a page event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub disposition: EventDisposition,
    pub effects: Vec<Effect>,
}

impl Dispatch {
    fn pass_through(effects: Vec<Effect>) -> Self {
        Self {
            disposition: EventDisposition::PassThrough,
            effects,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingIdentification,
    AwaitingSuggestion,
    Displaying,
}

/// How the last interaction with a field ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The knowledge base supplied the value; no suggestion was requested.
    Filled,
    Accepted,
    Discarded,
    /// The completion service declined with the refusal marker.
    Refused,
    /// The completion request failed.
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSession {
    pub state: SessionState,
    pub generation: u64,
    /// Name resolved on the most recent focus, if identification finished.
    pub name: Option<InferredName>,
    pub last_outcome: Option<SessionOutcome>,
}

impl FieldSession {
    fn advance(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        self.state = SessionState::Idle;
        self.last_outcome = Some(outcome);
    }
}

/// Per-page suggestion controller.
///
/// Owns every piece of mutable suggestion state of one page: the per-field
/// sessions, the active field, the single live suggestion and its overlay.
/// The profile is shared read-only.
#[derive(Debug)]
pub struct SuggestionController {
    profile: Arc<Profile>,
    identifier: FieldIdentifier,
    refusal_marker: String,
    overlay: OverlayRenderer,
    sessions: HashMap<NodeId, FieldSession>,
    active: Option<NodeId>,
    live: Option<Suggestion>,
}

impl SuggestionController {
    pub fn new(profile: Arc<Profile>, settings: &SuggestionSettings) -> Self {
        let context = ContextExtractor::new(settings.nearby_text_budget);
        Self {
            profile,
            identifier: FieldIdentifier::new(context, settings.ancestor_child_limit),
            refusal_marker: settings.refusal_marker.clone(),
            overlay: OverlayRenderer::new(),
            sessions: HashMap::new(),
            active: None,
            live: None,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn session(&self, field: NodeId) -> Option<&FieldSession> {
        self.sessions.get(&field)
    }

    /// The field that most recently gained focus and has not blurred since.
    pub fn active_field(&self) -> Option<NodeId> {
        self.active
    }

    pub fn live_suggestion(&self) -> Option<&Suggestion> {
        self.live.as_ref()
    }

    /// React to a host event. Events on nodes that are not text-entry fields
    /// are ignored.
    pub fn handle_event<D: DocumentMut + ?Sized>(&mut self, doc: &mut D, event: PageEvent) -> Dispatch {
        match event {
            PageEvent::Focus(field) if doc.is_text_entry(field) => Dispatch::pass_through(self.on_focus(doc, field)),
            PageEvent::Input(field) if doc.is_text_entry(field) => Dispatch::pass_through(self.on_input(doc, field)),
            PageEvent::Blur(field) if doc.is_text_entry(field) => {
                self.on_blur(doc, field);
                Dispatch::pass_through(Vec::new())
            }
            PageEvent::KeyDown(Key::Tab) => Dispatch {
                disposition: self.accept(doc),
                effects: Vec::new(),
            },
            _ => Dispatch::pass_through(Vec::new()),
        }
    }

    /// Apply a resolved request or timer signal.
    pub fn update<D: DocumentMut + ?Sized>(&mut self, doc: &mut D, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::DoneTyping(field) => self.on_done_typing(doc, field),
            Msg::FieldNameResolved { field, generation, name } => {
                if self.is_stale(field, generation, "field name") {
                    return Vec::new();
                }
                self.on_name(doc, field, name)
            }
            Msg::SuggestionResolved {
                field,
                generation,
                outcome,
            } => {
                if !self.is_stale(field, generation, "suggestion") {
                    self.on_suggestion(doc, field, outcome);
                }
                Vec::new()
            }
        }
    }

    fn on_focus<D: DocumentMut + ?Sized>(&mut self, doc: &mut D, field: NodeId) -> Vec<Effect> {
        self.active = Some(field);
        let session = self.sessions.entry(field).or_default();
        let generation = session.advance();
        session.state = SessionState::AwaitingIdentification;
        session.name = None;
        debug!(field = field.0, generation, "identifying focused field");

        match self.identifier.resolve(doc, field) {
            Resolution::Named(name, _) => self.on_name(doc, field, name),
            Resolution::NeedsInference { prompt } => vec![Effect::InferFieldName {
                field,
                generation,
                prompt,
            }],
        }
    }

    fn on_name<D: DocumentMut + ?Sized>(&mut self, doc: &mut D, field: NodeId, name: InferredName) -> Vec<Effect> {
        let session = self.sessions.entry(field).or_default();
        session.name = Some(name.clone());

        if let Some(value) = self.profile.lookup(name.as_str()) {
            doc.set_field_value(field, value);
            session.finish(SessionOutcome::Filled);
            debug!(field = field.0, name = %name, "filled from knowledge base");
            return Vec::new();
        }

        session.state = SessionState::AwaitingSuggestion;
        vec![Effect::RequestSuggestion {
            field,
            generation: session.generation,
            prompt: autofill_prompt(&self.profile.general_info, &name),
        }]
    }

    fn on_input<D: DocumentMut + ?Sized>(&mut self, doc: &mut D, field: NodeId) -> Vec<Effect> {
        self.discard_live(doc);
        let session = self.sessions.entry(field).or_default();
        session.advance();
        session.state = SessionState::Idle;
        vec![Effect::ScheduleDoneTyping(field)]
    }

    fn on_blur<D: DocumentMut + ?Sized>(&mut self, doc: &mut D, field: NodeId) {
        if self.live.as_ref().is_some_and(|live| live.field == field) {
            self.discard_live(doc);
        }
        if self.active == Some(field) {
            self.active = None;
        }
        if let Some(session) = self.sessions.get_mut(&field) {
            session.advance();
            session.state = SessionState::Idle;
        }
    }

    fn on_done_typing<D: DocumentMut + ?Sized>(&mut self, doc: &mut D, field: NodeId) -> Vec<Effect> {
        if self.active != Some(field) {
            debug!(field = field.0, "typing finished in an inactive field; skipped");
            return Vec::new();
        }
        let value = doc.field_value(field);
        let fragment = last_sentence_fragment(&value);
        if fragment.is_empty() {
            return Vec::new();
        }
        if self.live.as_ref().is_some_and(|live| live.field == field) {
            self.discard_live(doc);
        }

        let session = self.sessions.entry(field).or_default();
        let generation = session.advance();
        session.state = SessionState::AwaitingSuggestion;
        debug!(field = field.0, generation, "requesting typing suggestion");
        vec![Effect::RequestSuggestion {
            field,
            generation,
            prompt: fragment.to_string(),
        }]
    }

    fn on_suggestion<D: DocumentMut + ?Sized>(
        &mut self,
        doc: &mut D,
        field: NodeId,
        outcome: Result<String, CompletionError>,
    ) {
        let text = match outcome {
            Ok(text) => text,
            Err(error) => {
                warn!(field = field.0, error = %error, "suggestion request failed");
                self.finish(field, SessionOutcome::Failed);
                return;
            }
        };
        if text.starts_with(&self.refusal_marker) {
            info!(field = field.0, response = %text, "completion service declined to suggest");
            self.finish(field, SessionOutcome::Refused);
            return;
        }
        if text.is_empty() {
            if let Some(session) = self.sessions.get_mut(&field) {
                session.state = SessionState::Idle;
            }
            return;
        }

        if self.live.as_ref().is_some_and(|live| live.field != field) {
            self.discard_live(doc);
        }
        self.overlay.show(doc, field, &text);
        self.live = Some(Suggestion { field, text });
        self.sessions.entry(field).or_default().state = SessionState::Displaying;
    }

    /// Append the live suggestion to the active field.
    fn accept<D: DocumentMut + ?Sized>(&mut self, doc: &mut D) -> EventDisposition {
        let Some(field) = self.active else {
            return EventDisposition::PassThrough;
        };
        let Some(suggestion) = self.live.take_if(|live| live.field == field) else {
            return EventDisposition::PassThrough;
        };

        let mut value = doc.field_value(field);
        value.push_str(&suggestion.text);
        doc.set_field_value(field, &value);
        self.overlay.hide(doc);
        doc.focus(field);
        self.finish(field, SessionOutcome::Accepted);
        debug!(field = field.0, "suggestion accepted");
        EventDisposition::Consumed
    }

    fn discard_live<D: DocumentMut + ?Sized>(&mut self, doc: &mut D) {
        self.overlay.hide(doc);
        if let Some(suggestion) = self.live.take() {
            self.finish(suggestion.field, SessionOutcome::Discarded);
            debug!(field = suggestion.field.0, "suggestion discarded");
        }
    }

    fn finish(&mut self, field: NodeId, outcome: SessionOutcome) {
        self.sessions.entry(field).or_default().finish(outcome);
    }

    fn is_stale(&self, field: NodeId, generation: u64, what: &str) -> bool {
        let current = self.sessions.get(&field).map(|session| session.generation);
        let stale = current != Some(generation);
        if stale {
            debug!(field = field.0, generation, ?current, "dropping stale {what}");
        }
        stale
    }
}

/// Prompt used on focus when the knowledge base has no value for the field.
pub fn autofill_prompt(general_info: &str, field_name: &InferredName) -> String {
    format!("Based on this general information about me: \"{general_info}\", suggest a value for the field: {field_name}")
}
