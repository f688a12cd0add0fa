use serde::{Deserialize, Serialize};

/// CSS class carried by every ghost-text overlay.
pub const GHOST_TEXT_CLASS: &str = "ghost-text";

/// Description of a ghost-text overlay node.
///
/// The overlay is absolutely positioned in page coordinates, never receives
/// pointer events, and preserves whitespace so that leading spaces in a
/// completion stay visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Suggestion text rendered verbatim.
    pub text: String,
    /// Left edge in page coordinates (CSS pixels).
    pub left: f64,
    /// Top edge in page coordinates (CSS pixels).
    pub top: f64,
    pub font: String,
    pub padding: String,
    pub border: String,
    /// Foreground color of the ghost text.
    pub color: String,
    pub class_name: String,
    /// Always `false`: the overlay is decoration only.
    pub pointer_events: bool,
    /// Preserve whitespace (`white-space: pre`).
    pub preserve_whitespace: bool,
}
