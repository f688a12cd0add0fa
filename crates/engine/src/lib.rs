//! # Ghostfill Engine
//!
//! The engine infers what a text-entry field is for and drives inline "ghost
//! text" suggestions for it: trigger, fetch, render, then accept or discard.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use ghostfill_api::{CompletionError, CompletionService};
//! use ghostfill_engine::{MemoryDocument, SuggestionRuntime, SuggestionSettings};
//! use ghostfill_types::{DocumentTree, Key, PageEvent, Profile};
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl CompletionService for Canned {
//!     async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
//!         Ok("Lisbon".to_string())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut doc = MemoryDocument::new();
//! let city = doc.input(doc.body(), &[("name", "city")]);
//!
//! let profile = Arc::new(Profile::default());
//! let mut runtime = SuggestionRuntime::new(doc, Arc::new(Canned), profile, SuggestionSettings::default());
//! runtime.handle_event(PageEvent::Focus(city));
//! runtime.run_until_idle().await;
//!
//! runtime.handle_event(PageEvent::KeyDown(Key::Tab));
//! assert_eq!(runtime.document().field_value(city), "Lisbon");
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`context`**: page and nearby-text context strings
//! - **`identify`**: the field-name resolution chain
//! - **`debounce`**: typing quiet-period deadlines
//! - **`overlay`**: ghost-text overlay placement
//! - **`controller`**: the synchronous suggestion state machine
//! - **`runtime`**: the async loop executing controller effects
//! - **`memory`**: an in-memory document tree

pub mod context;
pub mod controller;
pub mod debounce;
pub mod identify;
pub mod memory;
pub mod overlay;
pub mod runtime;
pub mod settings;

pub use context::ContextExtractor;
pub use controller::{Dispatch, Effect, FieldSession, Msg, SessionOutcome, SessionState, SuggestionController, autofill_prompt};
pub use debounce::TypingDebouncer;
pub use identify::{FieldIdentifier, NameSource, Resolution, infer_field_name, inference_prompt};
pub use memory::MemoryDocument;
pub use overlay::{GHOST_TEXT_COLOR, OverlayRenderer, RenderedOverlay};
pub use runtime::SuggestionRuntime;
pub use settings::{DebounceScope, SuggestionSettings};
