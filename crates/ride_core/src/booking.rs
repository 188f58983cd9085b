//! The rider's in-progress booking request: location picks, ride type and
//! passenger count, mutated by user input and cleared on submission or
//! cancellation.

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::ride::RideType;

/// One end of the requested trip, as picked in the address search.
/// Coordinates stay unset until the geocoder resolves the pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPick {
    pub description: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl LocationPick {
    pub fn new(description: &str, lat: f64, lng: f64) -> Self {
        Self {
            description: Some(description.to_string()),
            lat: Some(lat),
            lng: Some(lng),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Resource)]
pub struct BookingForm {
    pub pickup: Option<LocationPick>,
    pub dropoff: Option<LocationPick>,
    pub ride_type: RideType,
    pub passengers: u8,
    /// Set to request a future ride instead of an immediate one.
    pub scheduled_to: Option<DateTime<Utc>>,
}

impl Default for BookingForm {
    fn default() -> Self {
        Self {
            pickup: None,
            dropoff: None,
            ride_type: RideType::Pool,
            passengers: 1,
            scheduled_to: None,
        }
    }
}

impl BookingForm {
    pub fn clear(&mut self) {
        *self = BookingForm::default();
    }
}

/// A request is ready to book iff both ends are set and each carries a
/// resolved latitude. No create/offer call may be issued otherwise.
pub fn ready_to_book(form: &BookingForm) -> bool {
    let resolved = |pick: &Option<LocationPick>| {
        pick.as_ref().map(|p| p.lat.is_some()).unwrap_or(false)
    };
    resolved(&form.pickup) && resolved(&form.dropoff)
}

/// Errors from user-initiated booking actions. Unlike background poll
/// failures these propagate to the presentation layer.
#[derive(Debug)]
pub enum BookingError {
    /// Request incomplete; nothing was sent to the backend.
    Validation(&'static str),
    /// Backend explicitly refused to create the ride/offer.
    Rejected,
    Api(ApiError),
}

impl From<ApiError> for BookingError {
    fn from(err: ApiError) -> Self {
        BookingError::Api(err)
    }
}
