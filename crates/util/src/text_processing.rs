//! # Text Processing Utilities
//!
//! Normalization helpers used to build prompt strings from page text, plus
//! redaction of credential-looking values before they reach log output.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Closed set of low-information words dropped by [`remove_stop_words`].
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it", "its", "of", "on", "that",
    "the", "to", "was", "were", "will", "with",
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Lower-cases `input`, splits it on single spaces, drops stop words, and
/// rejoins the remaining tokens with single spaces.
///
/// Matching is exact token equality: a stop word glued to punctuation
/// (`"the,"`) is kept, and runs of spaces survive as empty tokens.
///
/// # Example
/// ```rust
/// use ghostfill_util::text_processing::remove_stop_words;
///
/// assert_eq!(remove_stop_words("is a test for you"), "test you");
/// ```
pub fn remove_stop_words(input: &str) -> String {
    input
        .to_lowercase()
        .split(' ')
        .filter(|token| !STOP_WORD_SET.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The text after the last period of `text`, trimmed.
///
/// Used as the completion seed while the user types, so the collaborator only
/// sees the sentence currently being written.
pub fn last_sentence_fragment(text: &str) -> &str {
    text.rsplit('.').next().unwrap_or_default().trim()
}

/// Redacts values that look like secrets in a string.
///
/// Covers authorization headers, bearer tokens, `api-key` headers, and
/// `*_KEY=`/`*_TOKEN=` style assignments. Key names are preserved so that log
/// lines stay useful.
///
/// # Example
/// ```rust
/// use ghostfill_util::text_processing::redact_sensitive;
///
/// assert_eq!(redact_sensitive("api-key: abc123"), "api-key: [REDACTED]");
/// assert_eq!(redact_sensitive("AI_COMPLETIONS_API_KEY=abc123"), "AI_COMPLETIONS_API_KEY=[REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, "[REDACTED]")
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{replacement}")
            })
            .to_string();
    }
    redacted
}

fn redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?i)(authorization:\s+)([^\s]+(?:\s+[^\s]+)*)",
            r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)",
            r#"(?i)("?api-key"?\s*[:=]\s*"?)([^\s",}]+)"#,
            r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    });
    &REDACT_PATTERNS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_exact_stop_words() {
        assert_eq!(remove_stop_words("is a test for you"), "test you");
        assert_eq!(remove_stop_words("The Cat Is On The Mat"), "cat mat");
        assert_eq!(remove_stop_words("This Is A Test"), "this test");
    }

    #[test]
    fn keeps_punctuation_adjacent_stop_words() {
        assert_eq!(remove_stop_words("name of the, person"), "name the, person");
        assert_eq!(remove_stop_words("(a) option"), "(a) option");
    }

    #[test]
    fn splits_on_single_spaces_only() {
        // Double spaces yield an empty token that is not a stop word.
        assert_eq!(remove_stop_words("first  name"), "first  name");
        assert_eq!(remove_stop_words("email\tis"), "email\tis");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(remove_stop_words(""), "");
        assert_eq!(remove_stop_words("the a an"), "");
    }

    #[test]
    fn last_fragment_follows_final_period() {
        assert_eq!(last_sentence_fragment("I like Rust. It is fast"), "It is fast");
        assert_eq!(last_sentence_fragment("no period here "), "no period here");
        assert_eq!(last_sentence_fragment("Done."), "");
        assert_eq!(last_sentence_fragment(""), "");
    }

    #[test]
    fn redacts_api_key_header_and_assignments() {
        assert_eq!(redact_sensitive("api-key: secret-value"), "api-key: [REDACTED]");
        assert_eq!(redact_sensitive(r#"{"api-key":"secret"}"#), r#"{"api-key":"[REDACTED]"}"#);
        assert_eq!(redact_sensitive("Authorization: Bearer abc"), "Authorization: [REDACTED]");
        assert_eq!(redact_sensitive("MY_TOKEN=abc def"), "MY_TOKEN=[REDACTED] def");
        assert_eq!(redact_sensitive("nothing to hide"), "nothing to hide");
    }
}
