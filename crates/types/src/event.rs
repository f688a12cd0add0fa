use crate::document::NodeId;

/// Keys the suggestion flow reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    /// Any other key; carried so hosts can forward every keydown unfiltered.
    Other,
}

/// Events forwarded by the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// A node gained focus (capturing phase, so every node is reported).
    Focus(NodeId),
    /// The value of a node changed through user input.
    Input(NodeId),
    /// A node lost focus.
    Blur(NodeId),
    /// A key was pressed while the page had focus.
    KeyDown(Key),
}

/// What the host should do with the event's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// The event was handled; suppress the default action (e.g. Tab focus traversal).
    Consumed,
    /// Let the host apply its default behavior.
    PassThrough,
}
