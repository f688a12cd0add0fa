//! Shared data model for Ghostfill.
//!
//! These types cross crate boundaries: the document-tree host abstraction,
//! page events, overlay descriptions, and the values produced and consumed by
//! the suggestion engine.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod document;
pub mod event;
pub mod overlay;

pub use document::{DocumentMut, DocumentTree, NodeId, NodeKind, Rect, TextStyle};
pub use event::{EventDisposition, Key, PageEvent};
pub use overlay::{GHOST_TEXT_CLASS, Overlay};

/// Name returned when every identification step, including the completion
/// service, fails to produce one.
pub const UNKNOWN_FIELD_NAME: &str = "unknown field";

/// Human-meaningful name inferred for a text-entry field.
///
/// Used as the lookup key into the knowledge base. Never empty: the
/// identification chain always ends in a non-empty fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InferredName(String);

impl InferredName {
    /// Wrap `name`, rejecting empty values.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() { None } else { Some(Self(name)) }
    }

    /// The [`UNKNOWN_FIELD_NAME`] sentinel.
    pub fn unknown() -> Self {
        Self(UNKNOWN_FIELD_NAME.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for InferredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InferredName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalized context strings used to prompt for a field's purpose.
///
/// Recomputed for every request; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStrings {
    /// Title, h1-h3 text, and meta description, stop-word filtered.
    pub page_context: String,
    /// Text surrounding the field, stop-word filtered.
    pub nearby_text: String,
}

/// A completion fragment targeting one field.
///
/// At most one suggestion is live (rendered) at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub field: document::NodeId,
    pub text: String,
}

/// Persisted user profile read once at startup.
///
/// Serialized with the camelCase keys used by the settings surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Field name to previously supplied value.
    #[serde(default)]
    pub knowledge_base: IndexMap<String, String>,
    /// Free-text information about the user, fed into autofill prompts.
    #[serde(default)]
    pub general_info: String,
}

impl Profile {
    /// Build a profile from edited key/value rows, dropping rows whose key or
    /// value is empty. Later rows win on duplicate keys.
    pub fn from_entries<I, K, V>(general_info: impl Into<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let knowledge_base = rows
            .into_iter()
            .map(|(key, value)| -> (String, String) { (key.into(), value.into()) })
            .filter(|(key, value)| !key.is_empty() && !value.is_empty())
            .collect();
        Self {
            knowledge_base,
            general_info: general_info.into(),
        }
    }

    /// Stored value for `field_name`, ignoring empty entries.
    pub fn lookup(&self, field_name: &str) -> Option<&str> {
        self.knowledge_base
            .get(field_name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inferred_name_rejects_empty() {
        assert!(InferredName::new("").is_none());
        assert_eq!(InferredName::new("email").unwrap().as_str(), "email");
        assert_eq!(InferredName::unknown().as_str(), "unknown field");
    }

    #[test]
    fn profile_from_entries_drops_incomplete_rows() {
        let profile = Profile::from_entries(
            "I live in Lisbon",
            vec![("email", "me@example.com"), ("", "orphan"), ("phone", ""), ("city", "Lisbon")],
        );
        assert_eq!(profile.knowledge_base.len(), 2);
        assert_eq!(profile.lookup("email"), Some("me@example.com"));
        assert_eq!(profile.lookup("phone"), None);
        assert_eq!(profile.general_info, "I live in Lisbon");
    }

    #[test]
    fn profile_uses_camel_case_keys() {
        let raw = r#"{"knowledgeBase":{"name":"Ada"},"generalInfo":"mathematician"}"#;
        let profile: Profile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.lookup("name"), Some("Ada"));
        assert_eq!(profile.general_info, "mathematician");

        let encoded = serde_json::to_value(&profile).unwrap();
        assert!(encoded.get("knowledgeBase").is_some());
        assert!(encoded.get("generalInfo").is_some());
    }

    #[test]
    fn profile_tolerates_missing_keys() {
        let profile: Profile = serde_json::from_str("{}").unwrap();
        assert!(profile.knowledge_base.is_empty());
        assert!(profile.general_info.is_empty());
    }

    #[test]
    fn lookup_ignores_empty_values() {
        let mut profile = Profile::default();
        profile.knowledge_base.insert("name".into(), String::new());
        assert_eq!(profile.lookup("name"), None);
    }
}
