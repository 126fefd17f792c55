//! Ordered session event log
//!
//! The server side appends entries and assigns sequence numbers; every
//! participant feeds received entries through [`EventLog::receive`], which
//! releases them strictly in sequence order. Entries that arrive early are
//! held back until the gap is filled and duplicates are dropped, so both
//! participants apply the same transitions in the same order.

use std::collections::BTreeMap;

use crate::protocol::{ParticipantId, SessionEvent, SessionEventKind};

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<SessionEvent>,
    pending: BTreeMap<u64, SessionEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next entry will carry
    pub fn next_seq(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Entries delivered so far, in order
    pub fn entries(&self) -> &[SessionEvent] {
        &self.entries
    }

    /// Number of received entries still waiting for an earlier one
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Record a new entry as the authoritative source
    pub fn append(&mut self, sender: ParticipantId, kind: SessionEventKind) -> SessionEvent {
        let event = SessionEvent {
            seq: self.next_seq(),
            sender,
            kind,
        };
        self.entries.push(event.clone());
        event
    }

    /// Accept an entry from the authoritative source and return everything
    /// that is now deliverable, in order
    pub fn receive(&mut self, event: SessionEvent) -> Vec<SessionEvent> {
        if event.seq < self.next_seq() {
            return Vec::new();
        }
        self.pending.entry(event.seq).or_insert(event);

        let mut ready = Vec::new();
        while let Some(event) = self.pending.remove(&self.next_seq()) {
            self.entries.push(event.clone());
            ready.push(event);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn transition(seq: u64, state: u8) -> SessionEvent {
        SessionEvent {
            seq,
            sender: Uuid::nil(),
            kind: SessionEventKind::StateTransition { state },
        }
    }

    #[test]
    fn test_append_numbers_entries() {
        let mut log = EventLog::new();
        let sender = Uuid::new_v4();
        let first = log.append(sender, SessionEventKind::StateTransition { state: 1 });
        let second = log.append(sender, SessionEventKind::StateTransition { state: 2 });

        assert_eq!(first.seq, 0);
        assert_eq!(second.seq, 1);
        assert_eq!(log.next_seq(), 2);
    }

    #[test]
    fn test_out_of_order_entries_are_held_back() {
        let mut log = EventLog::new();

        assert!(log.receive(transition(1, 2)).is_empty());
        assert_eq!(log.pending(), 1);

        let ready = log.receive(transition(0, 1));
        let seqs: Vec<u64> = ready.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert_eq!(log.pending(), 0);
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let mut log = EventLog::new();
        assert_eq!(log.receive(transition(0, 1)).len(), 1);
        assert!(log.receive(transition(0, 1)).is_empty());
        assert_eq!(log.entries().len(), 1);
    }
}
