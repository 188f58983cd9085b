//! The rider session: owns the engine world and schedule, and exposes the
//! operations the presentation layer drives: lifecycle, tick pumping,
//! event draining, and user-initiated booking actions.
//!
//! Background polls swallow transport failures; user actions propagate
//! them to the caller for display.

use std::sync::Arc;

use bevy_ecs::prelude::{Schedule, World};

use crate::api::wire::{decode_offer, PreRideDetails, RideRequestBody, WireLocation};
use crate::api::{ApiError, ApiHandle, CreateOutcome, RideApi, RiderProfile};
use crate::booking::{self, BookingError, BookingForm, LocationPick};
use crate::clock::{SyncClock, Tick, TickKind};
use crate::config::SyncConfig;
use crate::engine::{run_next_tick, run_next_tick_with_hook, run_until, sync_schedule};
use crate::events::{UiEvent, UiEvents};
use crate::ride::{RideOffer, RideSnapshot, RideType};
use crate::state::{CurrentRide, FutureRides, OfferState, ProfileState, WallClock};

pub struct RideSession {
    world: World,
    schedule: Schedule,
    started: bool,
}

impl RideSession {
    pub fn new(api: Arc<dyn RideApi + Send + Sync>, config: SyncConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(SyncClock::default());
        world.insert_resource(config);
        world.insert_resource(ApiHandle(api));
        world.insert_resource(WallClock::default());
        world.insert_resource(CurrentRide::default());
        world.insert_resource(FutureRides::default());
        world.insert_resource(OfferState::default());
        world.insert_resource(ProfileState::default());
        world.insert_resource(UiEvents::default());
        world.insert_resource(BookingForm::default());

        Self {
            world,
            schedule: sync_schedule(),
            started: false,
        }
    }

    /// Overrides the wall-clock source; tests pin it to a fixed instant.
    pub fn with_wall_clock(mut self, wall: WallClock) -> Self {
        self.world.insert_resource(wall);
        self
    }

    // ---- lifecycle ----

    /// Schedules the initial poll and profile-refresh ticks. Idempotent:
    /// a started session is left untouched.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let mut clock = self.world.resource_mut::<SyncClock>();
        clock.schedule_in(0, TickKind::Poll);
        clock.schedule_in(0, TickKind::ProfileRefresh);
    }

    /// Cancels every scheduled tick: poll, profile refresh, and any live
    /// offer countdown. Idempotent; nothing fires after this.
    pub fn stop(&mut self) {
        self.started = false;
        self.world.resource_mut::<SyncClock>().cancel_all();
        *self.world.resource_mut::<OfferState>() = OfferState::NoOffer;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    // ---- tick pumping ----

    /// Engine time in virtual milliseconds.
    pub fn now(&self) -> u64 {
        self.world.resource::<SyncClock>().now()
    }

    pub fn next_tick_at(&self) -> Option<u64> {
        self.world.resource::<SyncClock>().next_tick_time()
    }

    pub fn live_timers(&self) -> usize {
        self.world.resource::<SyncClock>().live_timers()
    }

    pub fn run_next_tick(&mut self) -> bool {
        run_next_tick(&mut self.world, &mut self.schedule)
    }

    pub fn run_next_tick_with_hook<F>(&mut self, hook: F) -> bool
    where
        F: FnMut(&World, &Tick),
    {
        run_next_tick_with_hook(&mut self.world, &mut self.schedule, hook)
    }

    /// Processes every tick due at or before `deadline_ms`.
    pub fn run_until(&mut self, deadline_ms: u64) -> usize {
        run_until(&mut self.world, &mut self.schedule, deadline_ms)
    }

    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        self.world.resource_mut::<UiEvents>().drain()
    }

    // ---- read accessors ----

    pub fn snapshot(&self) -> Option<RideSnapshot> {
        self.world.resource::<CurrentRide>().snapshot.clone()
    }

    pub fn future_rides(&self) -> Vec<RideSnapshot> {
        self.world.resource::<FutureRides>().0.clone()
    }

    pub fn pickup_eta_min(&self) -> Option<i64> {
        self.world.resource::<CurrentRide>().pickup_eta_min
    }

    pub fn display_match_info(&self) -> bool {
        self.world.resource::<CurrentRide>().display_match_info
    }

    pub fn offer(&self) -> Option<RideOffer> {
        self.world.resource::<OfferState>().offer().cloned()
    }

    pub fn offer_expired(&self) -> bool {
        self.world.resource::<OfferState>().is_expired()
    }

    pub fn profile(&self) -> Option<RiderProfile> {
        self.world.resource::<ProfileState>().0.clone()
    }

    // ---- booking form ----

    pub fn set_pickup(&mut self, pick: LocationPick) {
        self.world.resource_mut::<BookingForm>().pickup = Some(pick);
    }

    pub fn set_dropoff(&mut self, pick: LocationPick) {
        self.world.resource_mut::<BookingForm>().dropoff = Some(pick);
    }

    pub fn set_ride_type(&mut self, ride_type: RideType) {
        self.world.resource_mut::<BookingForm>().ride_type = ride_type;
    }

    pub fn set_passengers(&mut self, passengers: u8) {
        self.world.resource_mut::<BookingForm>().passengers = passengers;
    }

    pub fn set_scheduled_to(&mut self, scheduled_to: Option<chrono::DateTime<chrono::Utc>>) {
        self.world.resource_mut::<BookingForm>().scheduled_to = scheduled_to;
    }

    pub fn ready_to_book(&self) -> bool {
        booking::ready_to_book(self.world.resource::<BookingForm>())
    }

    // ---- user-initiated actions ----

    /// Books a firm ride. Consumes any pending offer, clears the form and
    /// schedules a settle poll so the match shows up promptly.
    pub fn create_ride(&mut self) -> Result<(), BookingError> {
        let body = self.request_body()?;
        // The pending countdown stops before booking; an expiry must not
        // interleave with the creation call.
        self.clear_offer_timer();

        let api = self.api();
        match api.0.create_ride(&body)? {
            CreateOutcome::Rejected => {
                *self.world.resource_mut::<OfferState>() = OfferState::NoOffer;
                Err(BookingError::Rejected)
            }
            CreateOutcome::Created(_) => {
                *self.world.resource_mut::<OfferState>() = OfferState::NoOffer;
                self.world.resource_mut::<BookingForm>().clear();
                let delay = self.world.resource::<SyncConfig>().create_settle_delay_ms;
                self.world
                    .resource_mut::<SyncClock>()
                    .schedule_in(delay, TickKind::Poll);
                Ok(())
            }
        }
    }

    /// Requests a time-boxed offer. Replaces any prior offer, cancelling
    /// its countdown, and arms a fresh expiry timer.
    pub fn create_offer(&mut self) -> Result<RideOffer, BookingError> {
        let body = self.request_body()?;
        let api = self.api();
        match api.0.create_offer(&body)? {
            CreateOutcome::Rejected => Err(BookingError::Rejected),
            CreateOutcome::Created(wire) => {
                let offer = decode_offer(wire);
                self.clear_offer_timer();
                let ttl = self.world.resource::<SyncConfig>().offer_ttl_ms;
                let timer = self
                    .world
                    .resource_mut::<SyncClock>()
                    .schedule_in(ttl, TickKind::OfferExpiry);
                *self.world.resource_mut::<OfferState>() = OfferState::Pending {
                    offer: offer.clone(),
                    timer,
                };
                Ok(offer)
            }
        }
    }

    /// Withdraws the current offer, cancelling its countdown.
    pub fn cancel_offer(&mut self) {
        self.clear_offer_timer();
        *self.world.resource_mut::<OfferState>() = OfferState::NoOffer;
    }

    /// Cancels the active ride, then polls immediately so the local view
    /// reflects the cancellation.
    pub fn cancel_active_ride(&mut self) -> Result<(), ApiError> {
        let api = self.api();
        api.0.cancel_active_ride()?;
        self.world
            .resource_mut::<SyncClock>()
            .schedule_in(0, TickKind::Poll);
        Ok(())
    }

    pub fn cancel_future_ride(&mut self, ride_id: &str) -> Result<(), ApiError> {
        let api = self.api();
        api.0.cancel_future_ride(ride_id)?;
        self.world
            .resource_mut::<SyncClock>()
            .schedule_in(0, TickKind::Poll);
        Ok(())
    }

    /// ETA/price estimate for the current form. Requires both ends fully
    /// resolved.
    pub fn pre_ride_details(&self) -> Result<PreRideDetails, BookingError> {
        let form = self.world.resource::<BookingForm>();
        if !booking::ready_to_book(form) {
            return Err(BookingError::Validation(
                "pickup and dropoff with resolved coordinates are required",
            ));
        }
        let origin = location_of(form.pickup.as_ref())
            .ok_or(BookingError::Validation("pickup coordinates incomplete"))?;
        let destination = location_of(form.dropoff.as_ref())
            .ok_or(BookingError::Validation("dropoff coordinates incomplete"))?;

        let api = self.api();
        Ok(api.0.pre_ride_details(&origin, &destination)?)
    }

    /// Completed rides, newest first.
    pub fn ride_history(&self) -> Result<Vec<RideSnapshot>, ApiError> {
        let api = self.api();
        api.0
            .ride_history()?
            .into_iter()
            .map(|ride| {
                crate::api::wire::decode_ride(ride)
                    .map_err(|err| ApiError::Json(format!("ride history decode failed: {err:?}")))
            })
            .collect()
    }

    pub fn rate_ride(&self, external_id: &str, rating: u8) -> Result<(), ApiError> {
        let api = self.api();
        api.0.rate_ride(external_id, rating)?;
        Ok(())
    }

    // ---- internals ----

    /// Cancels the countdown of a pending offer, if one is live. Leaves the
    /// offer state itself untouched; callers decide what it becomes next.
    fn clear_offer_timer(&mut self) {
        if let OfferState::Pending { timer, .. } = &*self.world.resource::<OfferState>() {
            let timer = *timer;
            self.world.resource_mut::<SyncClock>().cancel(timer);
        }
    }

    fn api(&self) -> ApiHandle {
        self.world.resource::<ApiHandle>().clone()
    }

    fn request_body(&self) -> Result<RideRequestBody, BookingError> {
        let form = self.world.resource::<BookingForm>();
        if !booking::ready_to_book(form) {
            return Err(BookingError::Validation(
                "pickup and dropoff with resolved coordinates are required",
            ));
        }
        Ok(RideRequestBody::from_form(form))
    }
}

fn location_of(pick: Option<&LocationPick>) -> Option<WireLocation> {
    let pick = pick?;
    Some(WireLocation {
        lat: pick.lat?,
        lng: pick.lng?,
    })
}
