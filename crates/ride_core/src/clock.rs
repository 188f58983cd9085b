use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use bevy_ecs::prelude::Resource;

/// Kinds of scheduled work the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TickKind {
    /// Fetch the active ride and reconcile local state.
    Poll,
    /// Refresh the rider profile; independent of the ride poll.
    ProfileRefresh,
    /// A pending ride offer reached the end of its countdown.
    OfferExpiry,
}

/// Handle to one scheduled tick. Cancelling the handle guarantees the tick
/// never fires, even if it is already queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub timestamp: u64,
    pub kind: TickKind,
    pub timer: TimerId,
}

impl Ord for Tick {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp;
        // equal timestamps pop in scheduling order (timer ids are issued
        // monotonically).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.timer.cmp(&self.timer))
    }
}

impl PartialOrd for Tick {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The tick currently being processed; inserted by the engine before the
/// schedule runs so systems can gate on its kind.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentTick(pub Tick);

/// Virtual millisecond clock driving the sync engine. Time only advances
/// when a tick is popped, so tests can walk the timeline deterministically.
#[derive(Debug, Default, Resource)]
pub struct SyncClock {
    now: u64,
    next_timer: u64,
    ticks: BinaryHeap<Tick>,
    cancelled: HashSet<TimerId>,
}

impl SyncClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: TickKind) -> TimerId {
        debug_assert!(
            timestamp >= self.now,
            "tick timestamp must be >= current time"
        );
        let timer = TimerId(self.next_timer);
        self.next_timer += 1;
        self.ticks.push(Tick {
            timestamp,
            kind,
            timer,
        });
        timer
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: TickKind) -> TimerId {
        self.schedule_at(self.now.saturating_add(delay_ms), kind)
    }

    /// Cancels a scheduled tick. A cancelled tick is skipped on pop; a
    /// timer that already fired is a no-op.
    pub fn cancel(&mut self, timer: TimerId) {
        if self.ticks.iter().any(|tick| tick.timer == timer) {
            self.cancelled.insert(timer);
        }
    }

    /// Drops every scheduled tick. Nothing fires after this.
    pub fn cancel_all(&mut self) {
        self.ticks.clear();
        self.cancelled.clear();
    }

    /// Pops the next live tick and advances `now` to its timestamp.
    pub fn pop_next(&mut self) -> Option<Tick> {
        while let Some(tick) = self.ticks.pop() {
            if self.cancelled.remove(&tick.timer) {
                continue;
            }
            self.now = tick.timestamp;
            return Some(tick);
        }
        None
    }

    /// Timestamp of the next live tick, if any.
    pub fn next_tick_time(&self) -> Option<u64> {
        self.ticks
            .iter()
            .filter(|tick| !self.cancelled.contains(&tick.timer))
            .map(|tick| tick.timestamp)
            .min()
    }

    /// Number of ticks still due to fire.
    pub fn live_timers(&self) -> usize {
        self.ticks
            .iter()
            .filter(|tick| !self.cancelled.contains(&tick.timer))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.live_timers() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_ticks_in_time_order() {
        let mut clock = SyncClock::default();
        clock.schedule_at(10, TickKind::Poll);
        clock.schedule_at(5, TickKind::ProfileRefresh);
        clock.schedule_at(20, TickKind::Poll);

        let first = clock.pop_next().expect("first tick");
        assert_eq!(first.timestamp, 5);
        assert_eq!(first.kind, TickKind::ProfileRefresh);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().expect("second tick");
        assert_eq!(second.timestamp, 10);
        assert_eq!(clock.now(), 10);

        let third = clock.pop_next().expect("third tick");
        assert_eq!(third.timestamp, 20);
        assert_eq!(clock.now(), 20);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn equal_timestamps_pop_in_scheduling_order() {
        let mut clock = SyncClock::default();
        let first = clock.schedule_at(5, TickKind::Poll);
        let second = clock.schedule_at(5, TickKind::OfferExpiry);

        assert_eq!(clock.pop_next().map(|t| t.timer), Some(first));
        assert_eq!(clock.pop_next().map(|t| t.timer), Some(second));
    }

    #[test]
    fn cancelled_tick_never_fires() {
        let mut clock = SyncClock::default();
        let poll = clock.schedule_at(5, TickKind::Poll);
        let expiry = clock.schedule_at(10, TickKind::OfferExpiry);
        clock.cancel(expiry);

        assert_eq!(clock.live_timers(), 1);
        assert_eq!(clock.next_tick_time(), Some(5));
        assert_eq!(clock.pop_next().map(|t| t.timer), Some(poll));
        assert!(clock.pop_next().is_none());
    }

    #[test]
    fn cancel_of_fired_timer_is_noop() {
        let mut clock = SyncClock::default();
        let poll = clock.schedule_at(5, TickKind::Poll);
        assert!(clock.pop_next().is_some());

        clock.cancel(poll);
        let next = clock.schedule_in(5, TickKind::Poll);
        assert_eq!(clock.pop_next().map(|t| t.timer), Some(next));
    }

    #[test]
    fn cancel_all_leaves_no_live_timers() {
        let mut clock = SyncClock::default();
        clock.schedule_at(5, TickKind::Poll);
        clock.schedule_at(10, TickKind::ProfileRefresh);
        clock.schedule_at(15, TickKind::OfferExpiry);

        clock.cancel_all();
        assert_eq!(clock.live_timers(), 0);
        assert!(clock.pop_next().is_none());
        assert_eq!(clock.next_tick_time(), None);
    }

    #[test]
    fn schedule_in_is_relative_to_now() {
        let mut clock = SyncClock::default();
        clock.schedule_at(100, TickKind::Poll);
        clock.pop_next();

        clock.schedule_in(50, TickKind::Poll);
        assert_eq!(clock.next_tick_time(), Some(150));
    }
}
