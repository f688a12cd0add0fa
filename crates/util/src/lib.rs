//! Utility helpers shared across Ghostfill crates: text normalization, secret
//! redaction, the persisted profile store, and tracing setup.

pub mod logging;
pub mod path_processing;
pub mod profile_store;
pub mod text_processing;

pub use logging::init_tracing;
pub use path_processing::expand_tilde;
pub use profile_store::{InMemoryProfileStore, JsonProfileStore, PROFILE_PATH_ENV, ProfileStore, ProfileStoreError};
pub use text_processing::{last_sentence_fragment, redact_sensitive, remove_stop_words};
