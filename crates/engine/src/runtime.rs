//! Runtime: drives the suggestion controller for one page.
//!
//! Responsibilities
//! - Own the document handle, the controller and the typing debouncer.
//! - Execute controller [`Effect`]s: completion requests become futures in a
//!   `FuturesUnordered`, typing signals become debounce deadlines.
//! - Feed every resolution back into the controller as a [`Msg`].
//!
//! Everything runs on the caller's task. Document reads and writes happen
//! synchronously between awaits, so the heuristics never observe a document
//! that changes mid-chain.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use ghostfill_api::{CompletionClient, CompletionService};
use ghostfill_types::{DocumentMut, EventDisposition, PageEvent, Profile};
use ghostfill_util::{JsonProfileStore, ProfileStore};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::controller::{Effect, Msg, SuggestionController};
use crate::debounce::TypingDebouncer;
use crate::identify::infer_field_name;
use crate::settings::SuggestionSettings;

/// What woke the loop up.
enum Wake {
    Event(PageEvent),
    EventsClosed,
    Resolved(Msg),
    Deadline,
}

pub struct SuggestionRuntime<D, C: ?Sized> {
    document: D,
    controller: SuggestionController,
    debouncer: TypingDebouncer,
    completions: Arc<C>,
    in_flight: FuturesUnordered<BoxFuture<'static, Msg>>,
}

impl<D: DocumentMut> SuggestionRuntime<D, CompletionClient> {
    /// Assemble a runtime from the environment: the completion endpoint and
    /// key, the debounce settings and the persisted profile.
    pub fn from_environment(document: D) -> Result<Self> {
        let completions = CompletionClient::from_environment().context("configure completion client")?;
        let store = JsonProfileStore::with_defaults();
        let profile = store
            .load()
            .with_context(|| format!("load profile from {}", store.path().display()))?;
        info!(
            endpoint = %completions.endpoint(),
            known_fields = profile.knowledge_base.len(),
            "suggestion runtime configured"
        );
        Ok(Self::new(
            document,
            Arc::new(completions),
            Arc::new(profile),
            SuggestionSettings::from_environment(),
        ))
    }
}

impl<D, C> SuggestionRuntime<D, C>
where
    D: DocumentMut,
    C: CompletionService + ?Sized + 'static,
{
    pub fn new(document: D, completions: Arc<C>, profile: Arc<Profile>, settings: SuggestionSettings) -> Self {
        Self {
            document,
            controller: SuggestionController::new(profile, &settings),
            debouncer: TypingDebouncer::new(settings.quiet_period, settings.debounce_scope),
            completions,
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Mutable access for hosts that apply their own edits (typing, layout)
    /// before forwarding the matching event.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn controller(&self) -> &SuggestionController {
        &self.controller
    }

    pub fn into_document(self) -> D {
        self.document
    }

    /// True when no request is in flight and no typing signal is pending.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty() && self.debouncer.is_idle()
    }

    /// Apply a page event synchronously and queue any work it starts.
    ///
    /// The returned disposition tells the host whether to suppress the
    /// event's default action.
    pub fn handle_event(&mut self, event: PageEvent) -> EventDisposition {
        let dispatch = self.controller.handle_event(&mut self.document, event);
        self.apply(dispatch.effects);
        dispatch.disposition
    }

    /// Drive in-flight requests and typing deadlines until nothing is left.
    pub async fn run_until_idle(&mut self) {
        loop {
            let deadline = self.debouncer.next_deadline();
            let wake = tokio::select! {
                Some(msg) = self.in_flight.next(), if !self.in_flight.is_empty() => Wake::Resolved(msg),
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Wake::Deadline,
                else => break,
            };
            self.on_wake(wake);
        }
    }

    /// Host loop: process events from `events` alongside outstanding work.
    ///
    /// Dispositions are not reported back through the channel; hosts that
    /// must suppress Tab traversal call [`handle_event`](Self::handle_event)
    /// directly. Returns the document once the channel has closed and all
    /// outstanding work has drained.
    pub async fn run(mut self, mut events: mpsc::Receiver<PageEvent>) -> D {
        let mut events_open = true;
        loop {
            let deadline = self.debouncer.next_deadline();
            let wake = tokio::select! {
                maybe_event = events.recv(), if events_open => match maybe_event {
                    Some(event) => Wake::Event(event),
                    None => Wake::EventsClosed,
                },
                Some(msg) = self.in_flight.next(), if !self.in_flight.is_empty() => Wake::Resolved(msg),
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Wake::Deadline,
                else => break,
            };
            if matches!(wake, Wake::EventsClosed) {
                debug!("page event channel closed; draining outstanding work");
                events_open = false;
                continue;
            }
            self.on_wake(wake);
        }
        self.document
    }

    fn on_wake(&mut self, wake: Wake) {
        match wake {
            Wake::Event(event) => {
                self.handle_event(event);
            }
            Wake::Resolved(msg) => self.dispatch(msg),
            Wake::Deadline => {
                for field in self.debouncer.take_due(Instant::now()) {
                    self.dispatch(Msg::DoneTyping(field));
                }
            }
            Wake::EventsClosed => {}
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let effects = self.controller.update(&mut self.document, msg);
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScheduleDoneTyping(field) => self.debouncer.record_input(field, Instant::now()),
                Effect::InferFieldName {
                    field,
                    generation,
                    prompt,
                } => {
                    let completions = Arc::clone(&self.completions);
                    self.in_flight.push(Box::pin(async move {
                        let name = infer_field_name(completions.as_ref(), &prompt).await;
                        Msg::FieldNameResolved { field, generation, name }
                    }));
                }
                Effect::RequestSuggestion {
                    field,
                    generation,
                    prompt,
                } => {
                    let completions = Arc::clone(&self.completions);
                    self.in_flight.push(Box::pin(async move {
                        let outcome = completions.complete(&prompt).await;
                        Msg::SuggestionResolved {
                            field,
                            generation,
                            outcome,
                        }
                    }));
                }
            }
        }
    }
}
