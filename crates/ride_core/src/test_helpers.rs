//! Test helpers: wire fixtures and a scripted transport for driving the
//! engine without a backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::api::wire::{
    ActiveRideResponse, PreRideDetails, RideRequestBody, WireLocation, WireOffer, WireRide,
    WireStopPoint,
};
use crate::api::{ApiError, CreateOutcome, RideApi, RiderProfile};
use crate::booking::LocationPick;
use crate::config::SyncConfig;
use crate::ride::{RideState, StopPointKind, StopPointState};
use crate::session::RideSession;

pub fn pending_stop(id: &str) -> WireStopPoint {
    WireStopPoint {
        id: Some(id.to_string()),
        kind: None,
        state: StopPointState::Pending,
        description: None,
        lat: None,
        lng: None,
        eta: None,
        polyline: None,
        completed_at: None,
    }
}

pub fn completed_stop(id: &str, completed_at: DateTime<Utc>) -> WireStopPoint {
    WireStopPoint {
        id: Some(id.to_string()),
        kind: Some(StopPointKind::Pickup),
        state: StopPointState::Completed,
        description: None,
        lat: None,
        lng: None,
        eta: None,
        polyline: None,
        completed_at: Some(completed_at),
    }
}

pub fn wire_ride(id: &str, stop_points: Vec<WireStopPoint>) -> WireRide {
    WireRide {
        id: Some(id.to_string()),
        external_id: None,
        state: RideState::Active,
        stop_points,
        vehicle: None,
        driver: None,
        scheduled_to: None,
        rating: None,
        created_at: None,
    }
}

pub fn wire_offer(id: &str) -> WireOffer {
    WireOffer {
        id: Some(id.to_string()),
        state: None,
        expires_at: None,
        pickup: None,
        dropoff: None,
        price: None,
    }
}

pub fn active_response(ride: Option<WireRide>) -> ActiveRideResponse {
    ActiveRideResponse {
        ride,
        future_rides: Vec::new(),
    }
}

/// A scripted [RideApi]: queued responses pop in order; an exhausted queue
/// falls back to an empty active-ride response (no ride, no future rides).
#[derive(Default)]
pub struct ScriptedRideApi {
    active: Mutex<VecDeque<Result<ActiveRideResponse, ApiError>>>,
    ride_outcomes: Mutex<VecDeque<Result<CreateOutcome<WireRide>, ApiError>>>,
    offer_outcomes: Mutex<VecDeque<Result<CreateOutcome<WireOffer>, ApiError>>>,
    history: Mutex<Vec<WireRide>>,
    active_calls: AtomicUsize,
    create_ride_calls: AtomicUsize,
    create_offer_calls: AtomicUsize,
    cancel_active_calls: AtomicUsize,
    offer_sequence: AtomicUsize,
}

impl ScriptedRideApi {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_active(&self, response: Result<ActiveRideResponse, ApiError>) {
        self.active.lock().unwrap().push_back(response);
    }

    pub fn push_ride_outcome(&self, outcome: Result<CreateOutcome<WireRide>, ApiError>) {
        self.ride_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn push_offer_outcome(&self, outcome: Result<CreateOutcome<WireOffer>, ApiError>) {
        self.offer_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn set_history(&self, rides: Vec<WireRide>) {
        *self.history.lock().unwrap() = rides;
    }

    pub fn active_calls(&self) -> usize {
        self.active_calls.load(Ordering::SeqCst)
    }

    pub fn create_ride_calls(&self) -> usize {
        self.create_ride_calls.load(Ordering::SeqCst)
    }

    pub fn create_offer_calls(&self) -> usize {
        self.create_offer_calls.load(Ordering::SeqCst)
    }

    pub fn cancel_active_calls(&self) -> usize {
        self.cancel_active_calls.load(Ordering::SeqCst)
    }
}

impl RideApi for ScriptedRideApi {
    fn active_ride(&self) -> Result<ActiveRideResponse, ApiError> {
        self.active_calls.fetch_add(1, Ordering::SeqCst);
        self.active
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ActiveRideResponse::default()))
    }

    fn create_ride(&self, _request: &RideRequestBody) -> Result<CreateOutcome<WireRide>, ApiError> {
        self.create_ride_calls.fetch_add(1, Ordering::SeqCst);
        self.ride_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(CreateOutcome::Created(wire_ride(
                    "ride-created",
                    vec![pending_stop("sp-1"), pending_stop("sp-2")],
                )))
            })
    }

    fn create_offer(
        &self,
        _request: &RideRequestBody,
    ) -> Result<CreateOutcome<WireOffer>, ApiError> {
        self.create_offer_calls.fetch_add(1, Ordering::SeqCst);
        let sequence = self.offer_sequence.fetch_add(1, Ordering::SeqCst);
        self.offer_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(CreateOutcome::Created(wire_offer(&format!(
                    "offer-{sequence}"
                ))))
            })
    }

    fn cancel_active_ride(&self) -> Result<Option<WireRide>, ApiError> {
        self.cancel_active_calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    fn cancel_future_ride(&self, _ride_id: &str) -> Result<Option<WireRide>, ApiError> {
        Ok(None)
    }

    fn pre_ride_details(
        &self,
        _origin: &WireLocation,
        _destination: &WireLocation,
    ) -> Result<PreRideDetails, ApiError> {
        Ok(PreRideDetails::default())
    }

    fn ride_history(&self) -> Result<Vec<WireRide>, ApiError> {
        Ok(self.history.lock().unwrap().clone())
    }

    fn rate_ride(&self, _external_id: &str, _rating: u8) -> Result<Option<WireRide>, ApiError> {
        Ok(None)
    }

    fn profile(&self) -> Result<RiderProfile, ApiError> {
        Ok(RiderProfile {
            id: Some("rider-1".into()),
            first_name: Some("Dana".into()),
            last_name: Some("Levi".into()),
            avatar: None,
            email: None,
        })
    }
}

/// A session wired to a fresh scripted transport.
pub fn scripted_session() -> (RideSession, Arc<ScriptedRideApi>) {
    let api = ScriptedRideApi::shared();
    let session = RideSession::new(api.clone(), SyncConfig::default());
    (session, api)
}

/// A scripted session whose booking form is already ready to book.
pub fn booked_form_session() -> (RideSession, Arc<ScriptedRideApi>) {
    let (mut session, api) = scripted_session();
    session.set_pickup(LocationPick::new("Central Station", 52.52, 13.405));
    session.set_dropoff(LocationPick::new("Airport", 52.36, 13.5));
    (session, api)
}
