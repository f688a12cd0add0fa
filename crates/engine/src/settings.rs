//! Runtime settings for the suggestion engine.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Environment variable overriding the typing quiet period, in milliseconds.
pub const DEBOUNCE_MS_ENV: &str = "GHOSTFILL_DEBOUNCE_MS";
/// Environment variable selecting the debounce scope (`global` or `per-field`).
pub const DEBOUNCE_SCOPE_ENV: &str = "GHOSTFILL_DEBOUNCE_SCOPE";

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);
/// Characters gathered on each side of a field before stop-word filtering.
pub const DEFAULT_NEARBY_TEXT_BUDGET: usize = 100;
/// Ancestors with this many element children or more are too generic to name a field.
pub const DEFAULT_ANCESTOR_CHILD_LIMIT: usize = 5;
/// Prefix the completion service uses to decline a request.
pub const REFUSAL_MARKER: &str = "Unable to autofill:";

/// How many "done typing" timers may be pending at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DebounceScope {
    /// One timer for the whole page; a keystroke in any field cancels the
    /// signal pending for whichever field was typed in before.
    #[default]
    Global,
    /// One timer per field; typing in one field never cancels another's signal.
    PerField,
}

impl FromStr for DebounceScope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "per-field" | "per_field" | "field" => Ok(Self::PerField),
            other => Err(format!("unknown debounce scope '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionSettings {
    pub quiet_period: Duration,
    pub debounce_scope: DebounceScope,
    pub nearby_text_budget: usize,
    pub ancestor_child_limit: usize,
    pub refusal_marker: String,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            debounce_scope: DebounceScope::default(),
            nearby_text_budget: DEFAULT_NEARBY_TEXT_BUDGET,
            ancestor_child_limit: DEFAULT_ANCESTOR_CHILD_LIMIT,
            refusal_marker: REFUSAL_MARKER.to_string(),
        }
    }
}

impl SuggestionSettings {
    /// Defaults overridden by [`DEBOUNCE_MS_ENV`] and [`DEBOUNCE_SCOPE_ENV`].
    /// Unparsable values are ignored with a warning.
    pub fn from_environment() -> Self {
        let mut settings = Self::default();
        if let Some(quiet_period) = resolve_quiet_period() {
            settings.quiet_period = quiet_period;
        }
        if let Some(scope) = resolve_debounce_scope() {
            settings.debounce_scope = scope;
        }
        settings
    }
}

fn resolve_quiet_period() -> Option<Duration> {
    let raw = env::var(DEBOUNCE_MS_ENV).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(millis) => Some(Duration::from_millis(millis)),
        Err(error) => {
            warn!(value = %raw, error = %error, "ignoring invalid {DEBOUNCE_MS_ENV}");
            None
        }
    }
}

fn resolve_debounce_scope() -> Option<DebounceScope> {
    let raw = env::var(DEBOUNCE_SCOPE_ENV).ok()?;
    match raw.parse() {
        Ok(scope) => Some(scope),
        Err(error) => {
            warn!(value = %raw, error = %error, "ignoring invalid {DEBOUNCE_SCOPE_ENV}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = SuggestionSettings::default();
        assert_eq!(settings.quiet_period, Duration::from_millis(500));
        assert_eq!(settings.debounce_scope, DebounceScope::Global);
        assert_eq!(settings.nearby_text_budget, 100);
        assert_eq!(settings.ancestor_child_limit, 5);
        assert_eq!(settings.refusal_marker, "Unable to autofill:");
    }

    #[test]
    fn environment_overrides_apply() {
        temp_env::with_vars([(DEBOUNCE_MS_ENV, Some("250")), (DEBOUNCE_SCOPE_ENV, Some("per-field"))], || {
            let settings = SuggestionSettings::from_environment();
            assert_eq!(settings.quiet_period, Duration::from_millis(250));
            assert_eq!(settings.debounce_scope, DebounceScope::PerField);
        });
    }

    #[test]
    fn invalid_environment_values_fall_back() {
        temp_env::with_vars([(DEBOUNCE_MS_ENV, Some("soon")), (DEBOUNCE_SCOPE_ENV, Some("sometimes"))], || {
            assert_eq!(SuggestionSettings::from_environment(), SuggestionSettings::default());
        });
    }
}
