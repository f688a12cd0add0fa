//! Typing debounce.
//!
//! The debouncer is a pure deadline table: callers feed it input timestamps
//! and poll it for fields whose quiet period has elapsed. The runtime owns the
//! actual sleeping, which keeps this type trivially testable.

use std::time::Duration;

use ghostfill_types::NodeId;
use indexmap::IndexMap;
use tokio::time::Instant;

use crate::settings::DebounceScope;

#[derive(Debug, Clone)]
pub struct TypingDebouncer {
    quiet_period: Duration,
    scope: DebounceScope,
    pending: IndexMap<NodeId, Instant>,
}

impl TypingDebouncer {
    pub fn new(quiet_period: Duration, scope: DebounceScope) -> Self {
        Self {
            quiet_period,
            scope,
            pending: IndexMap::new(),
        }
    }

    /// Restart the quiet period for `field`.
    ///
    /// Under [`DebounceScope::Global`] this also cancels whatever other field
    /// was pending.
    pub fn record_input(&mut self, field: NodeId, now: Instant) {
        if self.scope == DebounceScope::Global {
            self.pending.clear();
        }
        self.pending.shift_remove(&field);
        self.pending.insert(field, now + self.quiet_period);
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every field whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<NodeId> {
        let mut due: Vec<(NodeId, Instant)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(field, deadline)| (*field, *deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);
        for (field, _) in &due {
            self.pending.shift_remove(field);
        }
        due.into_iter().map(|(field, _)| field).collect()
    }

    /// Drop the pending signal for `field`, if any.
    pub fn cancel(&mut self, field: NodeId) -> bool {
        self.pending.shift_remove(&field).is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    #[test]
    fn signal_is_timed_from_last_input() {
        let start = Instant::now();
        let field = NodeId(3);
        let mut debouncer = TypingDebouncer::new(QUIET, DebounceScope::Global);

        debouncer.record_input(field, start);
        debouncer.record_input(field, start + Duration::from_millis(200));
        debouncer.record_input(field, start + Duration::from_millis(400));

        assert_eq!(debouncer.next_deadline(), Some(start + Duration::from_millis(900)));
        assert!(debouncer.take_due(start + Duration::from_millis(899)).is_empty());
        assert_eq!(debouncer.take_due(start + Duration::from_millis(900)), vec![field]);
        assert!(debouncer.take_due(start + Duration::from_secs(5)).is_empty());
        assert!(debouncer.is_idle());
    }

    #[test]
    fn global_scope_keeps_one_timer() {
        let start = Instant::now();
        let mut debouncer = TypingDebouncer::new(QUIET, DebounceScope::Global);
        debouncer.record_input(NodeId(1), start);
        debouncer.record_input(NodeId(2), start + Duration::from_millis(100));

        assert_eq!(debouncer.take_due(start + Duration::from_secs(1)), vec![NodeId(2)]);
    }

    #[test]
    fn per_field_scope_keeps_independent_timers() {
        let start = Instant::now();
        let mut debouncer = TypingDebouncer::new(QUIET, DebounceScope::PerField);
        debouncer.record_input(NodeId(2), start + Duration::from_millis(100));
        debouncer.record_input(NodeId(1), start);

        assert_eq!(debouncer.next_deadline(), Some(start + QUIET));
        assert_eq!(debouncer.take_due(start + Duration::from_secs(1)), vec![NodeId(1), NodeId(2)]);
    }

    #[test]
    fn cancel_removes_pending_signal() {
        let start = Instant::now();
        let mut debouncer = TypingDebouncer::new(QUIET, DebounceScope::PerField);
        debouncer.record_input(NodeId(1), start);
        assert!(debouncer.cancel(NodeId(1)));
        assert!(!debouncer.cancel(NodeId(1)));
        assert_eq!(debouncer.next_deadline(), None);
    }
}
