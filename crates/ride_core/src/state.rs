//! Singleton resources holding the engine's mutable state. Only the
//! engine's systems and the session facade mutate these; the presentation
//! layer reads.

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Utc};

use crate::api::RiderProfile;
use crate::clock::TimerId;
use crate::ride::{RideOffer, RideSnapshot};

/// The rider's active ride plus presentation state derived from it on each
/// applied poll.
#[derive(Debug, Default, Resource)]
pub struct CurrentRide {
    pub snapshot: Option<RideSnapshot>,
    pub pickup_eta_min: Option<i64>,
    pub display_match_info: bool,
}

/// Scheduled rides queued behind the active one, as returned by the active
/// ride poll.
#[derive(Debug, Default, Resource)]
pub struct FutureRides(pub Vec<RideSnapshot>);

/// Offer countdown sub-state machine. A pending offer holds the timer that
/// will expire it; cancellation and replacement must cancel that timer.
/// Once expired or superseded, an offer never returns to pending.
#[derive(Debug, Default, Resource)]
pub enum OfferState {
    #[default]
    NoOffer,
    Pending {
        offer: RideOffer,
        timer: TimerId,
    },
    Expired {
        offer: RideOffer,
    },
}

impl OfferState {
    pub fn offer(&self) -> Option<&RideOffer> {
        match self {
            OfferState::NoOffer => None,
            OfferState::Pending { offer, .. } | OfferState::Expired { offer } => Some(offer),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OfferState::Pending { .. })
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, OfferState::Expired { .. })
    }
}

/// Rider profile, refreshed on its own tick.
#[derive(Debug, Default, Resource)]
pub struct ProfileState(pub Option<RiderProfile>);

/// Wall-clock source for ETA arithmetic. `Fixed` keeps tests
/// deterministic; engine scheduling itself runs on the virtual clock.
#[derive(Debug, Clone, Copy, Default, Resource)]
pub enum WallClock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl WallClock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            WallClock::System => Utc::now(),
            WallClock::Fixed(at) => *at,
        }
    }
}
