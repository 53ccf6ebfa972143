//! The agenda is the time-ordered set of pending actor activations.
//!
//! Entries with equal activation times are served in FIFO order of their
//! insertion, using a monotonically increasing sequence number as the tie
//! break.  The ordering never depends on the incidental behavior of the
//! underlying heap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::process::ActorId;

#[derive(Debug, Clone, Copy)]
pub(crate) struct AgendaEntry {
    pub(crate) time: f64,
    pub(crate) seq: u64,
    pub(crate) actor: ActorId,
}

impl PartialEq for AgendaEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AgendaEntry {}

impl PartialOrd for AgendaEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AgendaEntry {
    // Reversed, so the max-heap pops the earliest time, then the lowest
    // sequence number.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Default)]
pub(crate) struct Agenda {
    heap: BinaryHeap<AgendaEntry>,
    next_seq: u64,
}

impl Agenda {
    /// Insert an activation, returning the sequence number that identifies
    /// the entry.
    pub(crate) fn push(&mut self, actor: ActorId, time: f64) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(AgendaEntry { time, seq, actor });
        seq
    }

    pub(crate) fn pop(&mut self) -> Option<AgendaEntry> {
        self.heap.pop()
    }

    pub(crate) fn peek(&self) -> Option<&AgendaEntry> {
        self.heap.peek()
    }

    /// Number of entries, stale ones included.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_time_order() {
        let mut agenda = Agenda::default();
        agenda.push(ActorId(1), 5.0);
        agenda.push(ActorId(2), 1.0);
        agenda.push(ActorId(3), 3.0);
        let times: Vec<f64> = std::iter::from_fn(|| agenda.pop())
            .map(|entry| entry.time)
            .collect();
        assert_eq!(times, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn equal_times_are_fifo() {
        let mut agenda = Agenda::default();
        (1..=20).for_each(|actor| {
            agenda.push(ActorId(actor), 2.0);
        });
        agenda.push(ActorId(0), 1.0);
        let actors: Vec<u64> = std::iter::from_fn(|| agenda.pop())
            .map(|entry| entry.actor.0)
            .collect();
        let expected: Vec<u64> = (0..=20).collect();
        assert_eq!(actors, expected);
    }

    #[test]
    fn sequence_numbers_increase() {
        let mut agenda = Agenda::default();
        let first = agenda.push(ActorId(1), 0.0);
        let second = agenda.push(ActorId(1), 0.0);
        assert!(second > first);
        assert_eq!(agenda.len(), 2);
        assert_eq!(agenda.peek().map(|entry| entry.seq), Some(first));
    }
}
