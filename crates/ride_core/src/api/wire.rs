//! Wire types for the ride backend REST API and their conversion into the
//! domain model. Responses carry snake_case ORM rows; request bodies are
//! camelCase, matching the backend contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::booking::BookingForm;
use crate::polyline::{self, PolylineError};
use crate::ride::{
    DriverInfo, LatLng, RideOffer, RideSnapshot, RideState, RideType, StopPoint, StopPointKind,
    StopPointState, Vehicle,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveRideResponse {
    pub ride: Option<WireRide>,
    #[serde(default, rename = "futureRides")]
    pub future_rides: Vec<WireRide>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRide {
    pub id: Option<String>,
    pub external_id: Option<String>,
    pub state: RideState,
    #[serde(default)]
    pub stop_points: Vec<WireStopPoint>,
    pub vehicle: Option<WireVehicle>,
    pub driver: Option<WireDriver>,
    pub scheduled_to: Option<DateTime<Utc>>,
    pub rating: Option<f32>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireStopPoint {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<StopPointKind>,
    pub state: StopPointState,
    pub description: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub eta: Option<DateTime<Utc>>,
    /// Encoded route to this stop; decoded during conversion.
    pub polyline: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireVehicle {
    pub model: Option<String>,
    pub license_number: Option<String>,
    pub image: Option<String>,
    pub location: Option<WireLocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireDriver {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireOffer {
    pub id: Option<String>,
    /// `"rejected"` when the backend refuses the offer.
    pub state: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub pickup: Option<WireOfferLeg>,
    pub dropoff: Option<WireOfferLeg>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireOfferLeg {
    pub eta: Option<DateTime<Utc>>,
}

/// Single-ride envelope returned by the cancel and rating endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RideEnvelope {
    pub ride: Option<WireRide>,
}

/// Ride-list envelope returned by the history endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RidesEnvelope {
    #[serde(default)]
    pub rides: Vec<WireRide>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct PreRideDetails {
    pub eta: Option<DateTime<Utc>>,
    pub duration_seconds: Option<u64>,
    pub distance_meters: Option<u64>,
    pub price: Option<f64>,
}

/// Body of `POST rides` and `POST rides/offer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_lng: Option<f64>,
    pub number_of_passengers: u8,
    pub ride_type: RideType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_to: Option<DateTime<Utc>>,
}

impl RideRequestBody {
    pub fn from_form(form: &BookingForm) -> Self {
        let (pickup_address, pickup_lat, pickup_lng) = match &form.pickup {
            Some(pick) => (pick.description.clone(), pick.lat, pick.lng),
            None => (None, None, None),
        };
        let (dropoff_address, dropoff_lat, dropoff_lng) = match &form.dropoff {
            Some(pick) => (pick.description.clone(), pick.lat, pick.lng),
            None => (None, None, None),
        };
        Self {
            pickup_address,
            pickup_lat,
            pickup_lng,
            dropoff_address,
            dropoff_lat,
            dropoff_lng,
            number_of_passengers: form.passengers,
            ride_type: form.ride_type,
            scheduled_to: form.scheduled_to,
        }
    }
}

/// Decode failure while converting a wire ride into a snapshot. Treated as
/// a parse failure by the poll: the tick is skipped and state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Polyline(PolylineError),
}

impl From<PolylineError> for DecodeError {
    fn from(err: PolylineError) -> Self {
        DecodeError::Polyline(err)
    }
}

/// Converts a wire ride into the domain snapshot, decoding every encoded
/// stop point route along the way.
pub fn decode_ride(ride: WireRide) -> Result<RideSnapshot, DecodeError> {
    let stop_points = ride
        .stop_points
        .into_iter()
        .map(decode_stop_point)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RideSnapshot {
        id: ride.id,
        external_id: ride.external_id,
        state: ride.state,
        stop_points,
        vehicle: ride.vehicle.map(decode_vehicle),
        driver: ride.driver.map(|driver| DriverInfo {
            first_name: driver.first_name,
            last_name: driver.last_name,
            avatar: driver.avatar,
        }),
        scheduled_to: ride.scheduled_to,
        rating: ride.rating,
        created_at: ride.created_at,
    })
}

fn decode_stop_point(stop: WireStopPoint) -> Result<StopPoint, DecodeError> {
    let polyline = stop
        .polyline
        .as_deref()
        .map(polyline::decode)
        .transpose()?;

    Ok(StopPoint {
        id: stop.id,
        kind: stop.kind,
        state: stop.state,
        description: stop.description,
        lat: stop.lat,
        lng: stop.lng,
        eta: stop.eta,
        polyline,
        completed_at: stop.completed_at,
    })
}

fn decode_vehicle(vehicle: WireVehicle) -> Vehicle {
    Vehicle {
        model: vehicle.model,
        license_number: vehicle.license_number,
        image: vehicle.image,
        location: vehicle.location.map(|location| LatLng {
            latitude: location.lat,
            longitude: location.lng,
        }),
    }
}

pub fn decode_offer(offer: WireOffer) -> RideOffer {
    RideOffer {
        id: offer.id,
        expires_at: offer.expires_at,
        pickup_eta: offer.pickup.and_then(|leg| leg.eta),
        dropoff_eta: offer.dropoff.and_then(|leg| leg.eta),
        price: offer.price,
    }
}
