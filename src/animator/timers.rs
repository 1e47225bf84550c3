//! One-shot timers polled against the frame clock.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

/// What happens when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerEvent {
    /// Start the growth animation of the building at this index.
    StartBuilding(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    due: Duration,
    /// Insertion counter; breaks ties between equal due times.
    seq: u64,
    event: TimerEvent,
}

/// Min-heap of pending one-shot events keyed by due time.
#[derive(Debug, Default)]
pub struct Timers {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, event: TimerEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { due, seq, event }));
    }

    /// Removes and returns every event due at or before `now`, earliest
    /// first, each paired with the time it was scheduled for.
    pub fn drain_due(&mut self, now: Duration) -> Vec<(Duration, TimerEvent)> {
        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.due > now {
                break;
            }
            due.push((entry.due, entry.event));
            self.heap.pop();
        }
        due
    }

    pub fn cancel_all(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Due time of the earliest pending event.
    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(entry)| entry.due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_drain_due_orders_by_time_then_insertion() {
        let mut timers = Timers::new();
        timers.schedule(ms(1000), TimerEvent::StartBuilding(2));
        timers.schedule(ms(0), TimerEvent::StartBuilding(0));
        timers.schedule(ms(500), TimerEvent::StartBuilding(3));
        timers.schedule(ms(500), TimerEvent::StartBuilding(1));

        assert_eq!(
            timers.drain_due(ms(600)),
            vec![
                (ms(0), TimerEvent::StartBuilding(0)),
                (ms(500), TimerEvent::StartBuilding(3)),
                (ms(500), TimerEvent::StartBuilding(1)),
            ]
        );
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_due(), Some(ms(1000)));
    }

    #[test]
    fn test_timer_fires_at_exact_due_time() {
        let mut timers = Timers::new();
        timers.schedule(ms(500), TimerEvent::StartBuilding(1));
        assert!(timers.drain_due(ms(499)).is_empty());
        assert_eq!(
            timers.drain_due(ms(500)),
            vec![(ms(500), TimerEvent::StartBuilding(1))]
        );
        assert!(timers.drain_due(ms(10_000)).is_empty());
    }

    #[test]
    fn test_late_drain_reports_scheduled_time() {
        let mut timers = Timers::new();
        timers.schedule(ms(500), TimerEvent::StartBuilding(1));
        timers.schedule(ms(1000), TimerEvent::StartBuilding(2));
        assert_eq!(
            timers.drain_due(ms(1700)),
            vec![
                (ms(500), TimerEvent::StartBuilding(1)),
                (ms(1000), TimerEvent::StartBuilding(2)),
            ]
        );
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = Timers::new();
        timers.schedule(ms(0), TimerEvent::StartBuilding(0));
        timers.schedule(ms(5), TimerEvent::StartBuilding(1));
        timers.cancel_all();
        assert!(timers.is_empty());
        assert!(timers.drain_due(ms(100)).is_empty());
    }
}
