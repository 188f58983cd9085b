//! Transport seam between the sync engine and the ride backend. The engine
//! only sees the [RideApi] trait; the blocking HTTP implementation lives
//! behind the `http` feature.

pub mod wire;

#[cfg(feature = "http")]
pub mod http;

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use serde::Deserialize;

use wire::{ActiveRideResponse, PreRideDetails, RideRequestBody, WireLocation, WireOffer, WireRide};

/// Errors from the ride backend transport.
#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout).
    Transport(String),
    /// Body did not decode as the expected JSON shape.
    Json(String),
    /// Backend answered with an error status or payload.
    Api(String),
}

/// Outcome of a creation call. The backend refuses with an explicit
/// rejected payload, which is not a transport error.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome<T> {
    Created(T),
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RiderProfile {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
}

/// The REST surface the engine consumes.
pub trait RideApi {
    /// `GET rides/active`: current active ride plus queued future rides.
    fn active_ride(&self) -> Result<ActiveRideResponse, ApiError>;

    /// `POST rides`: create a ride (immediate or scheduled).
    fn create_ride(&self, request: &RideRequestBody) -> Result<CreateOutcome<WireRide>, ApiError>;

    /// `POST rides/offer`: propose a ride for rider confirmation.
    fn create_offer(&self, request: &RideRequestBody)
        -> Result<CreateOutcome<WireOffer>, ApiError>;

    /// `POST rides/cancel-active-ride`.
    fn cancel_active_ride(&self) -> Result<Option<WireRide>, ApiError>;

    /// `POST rides/cancel-future-ride`.
    fn cancel_future_ride(&self, ride_id: &str) -> Result<Option<WireRide>, ApiError>;

    /// `GET rides/pre`: ETA/price estimate for a prospective trip.
    fn pre_ride_details(
        &self,
        origin: &WireLocation,
        destination: &WireLocation,
    ) -> Result<PreRideDetails, ApiError>;

    /// `GET rides/history`: completed rides, newest first.
    fn ride_history(&self) -> Result<Vec<WireRide>, ApiError>;

    /// `POST rides/rating`.
    fn rate_ride(&self, external_id: &str, rating: u8) -> Result<Option<WireRide>, ApiError>;

    /// `GET me`: the rider profile.
    fn profile(&self) -> Result<RiderProfile, ApiError>;
}

/// Shared transport handle stored in the engine world.
#[derive(Clone, Resource)]
pub struct ApiHandle(pub Arc<dyn RideApi + Send + Sync>);
