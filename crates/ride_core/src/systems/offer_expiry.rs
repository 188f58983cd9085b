//! Offer expiry tick: moves a pending offer to expired when its countdown
//! fires. The presentation layer is notified so it can show the expiry
//! affordance.

use bevy_ecs::prelude::{Res, ResMut};
use tracing::debug;

use crate::clock::{CurrentTick, TickKind};
use crate::events::{UiEvent, UiEvents};
use crate::state::OfferState;

pub fn offer_expiry_system(
    tick: Res<CurrentTick>,
    mut offer: ResMut<OfferState>,
    mut events: ResMut<UiEvents>,
) {
    if tick.0.kind != TickKind::OfferExpiry {
        return;
    }

    // A timer belonging to a superseded offer must not expire the current one.
    let OfferState::Pending { timer, .. } = &*offer else {
        return;
    };
    if *timer != tick.0.timer {
        return;
    }

    if let OfferState::Pending { offer: pending, .. } = std::mem::take(&mut *offer) {
        debug!(offer_id = ?pending.id, "ride offer expired");
        *offer = OfferState::Expired { offer: pending };
        events.push(UiEvent::OfferExpired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};

    use crate::clock::{SyncClock, Tick};
    use crate::ride::RideOffer;

    fn offer() -> RideOffer {
        RideOffer {
            id: Some("offer-1".into()),
            expires_at: None,
            pickup_eta: None,
            dropoff_eta: None,
            price: None,
        }
    }

    fn run_tick(world: &mut World, tick: Tick) {
        world.insert_resource(CurrentTick(tick));
        let mut schedule = Schedule::default();
        schedule.add_systems(offer_expiry_system);
        schedule.run(world);
    }

    #[test]
    fn pending_offer_expires_on_its_timer() {
        let mut world = World::new();
        let mut clock = SyncClock::default();
        let timer = clock.schedule_in(10_000, TickKind::OfferExpiry);
        let tick = clock.pop_next().expect("tick");
        world.insert_resource(clock);
        world.insert_resource(UiEvents::default());
        world.insert_resource(OfferState::Pending {
            offer: offer(),
            timer,
        });

        run_tick(&mut world, tick);

        assert!(world.resource::<OfferState>().is_expired());
        assert_eq!(
            world.resource_mut::<UiEvents>().drain(),
            vec![UiEvent::OfferExpired]
        );
    }

    #[test]
    fn stale_timer_does_not_expire_a_newer_offer() {
        let mut world = World::new();
        let mut clock = SyncClock::default();
        let stale = clock.schedule_in(10_000, TickKind::OfferExpiry);
        let fresh = clock.schedule_in(12_000, TickKind::OfferExpiry);
        let tick = clock.pop_next().expect("tick");
        assert_eq!(tick.timer, stale);
        world.insert_resource(clock);
        world.insert_resource(UiEvents::default());
        world.insert_resource(OfferState::Pending {
            offer: offer(),
            timer: fresh,
        });

        run_tick(&mut world, tick);

        assert!(world.resource::<OfferState>().is_pending());
        assert!(world.resource::<UiEvents>().is_empty());
    }
}
