//! Tick scheduler: one pending timer per slot on a virtual millisecond clock.
//!
//! Requests for a slot that already has a pending tick coalesce into it instead of
//! queueing a second one. The pending tick keeps the later deadline and the newer kind.

use log::trace;

/// Tagged timer callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// First drop tick of a freshly spawned piece.
    Create,
    /// Normal gravity.
    Tick,
    /// Player-accelerated descent.
    TickFast,
    /// Deferred settle and re-match.
    ColumnCheck,
}

impl TickKind {
    /// Create and Tick share the drop slot.
    fn slot(self) -> usize {
        match self {
            Self::Create | Self::Tick => 0,
            Self::TickFast => 1,
            Self::ColumnCheck => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    kind: TickKind,
    due: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: u64,
    slots: [Option<Pending>; 3],
    coalesced: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in ms.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Requests `kind` after `delay_ms`. Returns false when it merged into a pending tick.
    pub fn schedule(&mut self, kind: TickKind, delay_ms: u64) -> bool {
        let due = self.now + delay_ms;
        let slot = kind.slot();
        if let Some(pending) = self.slots[slot].as_mut() {
            pending.due = pending.due.max(due);
            pending.kind = kind;
            let merged_due = pending.due;
            self.coalesced += 1;
            trace!("{kind:?} coalesced, due at {merged_due}");
            return false;
        }
        self.slots[slot] = Some(Pending { kind, due });
        true
    }

    pub fn cancel(&mut self, kind: TickKind) {
        self.slots[kind.slot()] = None;
    }

    pub fn clear(&mut self) {
        self.slots = [None; 3];
    }

    /// True if a tick is pending in `kind`'s slot.
    pub fn is_pending(&self, kind: TickKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    /// Kind and deadline pending in `kind`'s slot.
    #[cfg(test)]
    pub fn pending(&self, kind: TickKind) -> Option<(TickKind, u64)> {
        self.slots[kind.slot()].map(|p| (p.kind, p.due))
    }

    /// Number of requests merged into an already pending tick.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// Removes and returns the earliest tick due at or before `until`, moving the clock
    /// to its deadline. Ties go to the lower slot.
    pub fn pop_due(&mut self, until: u64) -> Option<TickKind> {
        let slot = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (i, p)))
            .filter(|(_, p)| p.due <= until)
            .min_by_key(|(i, p)| (p.due, *i))
            .map(|(i, _)| i)?;
        let pending = self.slots[slot].take()?;
        self.now = self.now.max(pending.due);
        Some(pending.kind)
    }

    /// Moves the clock to `until` once nothing more is due.
    pub fn settle_clock(&mut self, until: u64) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule(TickKind::ColumnCheck, 30);
        s.schedule(TickKind::Tick, 10);
        s.schedule(TickKind::TickFast, 20);
        assert_eq!(s.pop_due(100), Some(TickKind::Tick));
        assert_eq!(s.now(), 10);
        assert_eq!(s.pop_due(100), Some(TickKind::TickFast));
        assert_eq!(s.pop_due(100), Some(TickKind::ColumnCheck));
        assert_eq!(s.pop_due(100), None);
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let mut s = Scheduler::new();
        s.schedule(TickKind::Tick, 500);
        assert_eq!(s.pop_due(499), None);
        assert_eq!(s.pop_due(500), Some(TickKind::Tick));
    }

    #[test]
    fn repeated_requests_coalesce_to_latest_deadline() {
        let mut s = Scheduler::new();
        assert!(s.schedule(TickKind::Tick, 100));
        assert!(!s.schedule(TickKind::Tick, 300));
        assert!(!s.schedule(TickKind::Tick, 50));
        assert_eq!(s.pending(TickKind::Tick), Some((TickKind::Tick, 300)));
        assert_eq!(s.coalesced(), 2);
        assert_eq!(s.pop_due(299), None);
        assert_eq!(s.pop_due(300), Some(TickKind::Tick));
        assert_eq!(s.pop_due(10_000), None);
    }

    #[test]
    fn create_and_tick_share_a_slot() {
        let mut s = Scheduler::new();
        s.schedule(TickKind::Tick, 100);
        s.schedule(TickKind::Create, 100);
        assert!(s.is_pending(TickKind::Tick));
        assert_eq!(s.pending(TickKind::Tick), Some((TickKind::Create, 100)));
        assert_eq!(s.pop_due(100), Some(TickKind::Create));
        assert!(!s.is_pending(TickKind::Create));
    }

    #[test]
    fn cancel_drops_pending_tick() {
        let mut s = Scheduler::new();
        s.schedule(TickKind::TickFast, 20);
        s.cancel(TickKind::TickFast);
        assert_eq!(s.pop_due(1000), None);
    }

    #[test]
    fn delays_are_relative_to_last_fired_tick() {
        let mut s = Scheduler::new();
        s.schedule(TickKind::Tick, 500);
        assert_eq!(s.pop_due(2000), Some(TickKind::Tick));
        s.schedule(TickKind::Tick, 500);
        assert_eq!(s.pending(TickKind::Tick), Some((TickKind::Tick, 1000)));
        s.settle_clock(2000);
        assert_eq!(s.now(), 2000);
    }
}
