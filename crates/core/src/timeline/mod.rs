use std::time::Duration;

/// Virtual session clock. Time only moves when the driver advances it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    now: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, delta: Duration) -> Duration {
        self.now += delta;
        self.now
    }
}

/// A pending event and the time it becomes due.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent<E> {
    pub due: Duration,
    pub event: E,
    seq: u64,
}

/// Ordered queue of timed events. Events due at the same instant fire in the
/// order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<E> {
    events: Vec<ScheduledEvent<E>>,
    next_seq: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let position = self
            .events
            .partition_point(|pending| (pending.due, pending.seq) <= (due, seq));
        self.events.insert(position, ScheduledEvent { due, event, seq });
    }

    /// Removes and returns the earliest event due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledEvent<E>> {
        if self.events.first().is_some_and(|event| event.due <= now) {
            Some(self.events.remove(0))
        } else {
            None
        }
    }

    /// Drops every pending event matching `predicate` and returns how many
    /// were removed.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&E) -> bool) -> usize {
        let before = self.events.len();
        self.events.retain(|pending| !predicate(&pending.event));
        before - self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent<E>> {
        self.events.iter()
    }
}
