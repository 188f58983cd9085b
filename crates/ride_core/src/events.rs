//! Discrete signals for the presentation layer. Events emitted within one
//! tick keep a fixed order; the embedder drains them after pumping ticks.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;

use crate::ride::RideSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The local ride view changed; `None` means no active ride remains.
    SnapshotUpdated(Option<RideSnapshot>),
    /// One-shot signal to refit the map viewport to the current route.
    RecenterMap,
    RideCompleted,
    RideCanceled,
    OfferExpired,
}

#[derive(Debug, Default, Resource)]
pub struct UiEvents {
    queue: VecDeque<UiEvent>,
}

impl UiEvents {
    pub fn push(&mut self, event: UiEvent) {
        self.queue.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<UiEvent> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_drain_in_emission_order() {
        let mut events = UiEvents::default();
        events.push(UiEvent::RideCompleted);
        events.push(UiEvent::SnapshotUpdated(None));

        assert_eq!(
            events.drain(),
            vec![UiEvent::RideCompleted, UiEvent::SnapshotUpdated(None)]
        );
        assert!(events.is_empty());
    }
}
