//! Domain model for the rider's view of a ride: snapshots, stop points,
//! offers. The backend is the source of truth; these are the in-memory
//! copies the engine reconciles on every poll.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinate as consumed by the map layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideState {
    Pending,
    Active,
    Completed,
    Canceled,
    /// Creation was refused by the backend; never seen on an active ride.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopPointState {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopPointKind {
    Pickup,
    Dropoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideType {
    Pool,
    Private,
}

/// A pickup or dropoff within a ride, with its own completion/ETA/route
/// state. Index 0 of a ride's stop points is the pickup, index 1 the
/// dropoff; consumers must not assume more entries exist.
#[derive(Debug, Clone, PartialEq)]
pub struct StopPoint {
    pub id: Option<String>,
    pub kind: Option<StopPointKind>,
    pub state: StopPointState,
    pub description: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub eta: Option<DateTime<Utc>>,
    /// Route to this stop, decoded from the backend's encoded polyline.
    pub polyline: Option<Vec<LatLng>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub model: Option<String>,
    pub license_number: Option<String>,
    pub image: Option<String>,
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

/// The current state of a rider's ride as last fetched from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RideSnapshot {
    pub id: Option<String>,
    /// Id in the dispatch provider's namespace; used for rating.
    pub external_id: Option<String>,
    pub state: RideState,
    pub stop_points: Vec<StopPoint>,
    pub vehicle: Option<Vehicle>,
    pub driver: Option<DriverInfo>,
    /// Set on future (scheduled) rides.
    pub scheduled_to: Option<DateTime<Utc>>,
    pub rating: Option<f32>,
    pub created_at: Option<DateTime<Utc>>,
}

impl RideSnapshot {
    pub fn pickup(&self) -> Option<&StopPoint> {
        self.stop_points.first()
    }

    pub fn dropoff(&self) -> Option<&StopPoint> {
        self.stop_points.get(1)
    }

    /// First stop point still pending. Its identity drives the route shown
    /// on the map and the recenter signal.
    pub fn active_stop_point(&self) -> Option<&StopPoint> {
        self.stop_points
            .iter()
            .find(|sp| sp.state == StopPointState::Pending)
    }
}

/// Why an active ride stopped appearing in poll responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disappearance {
    Completed,
    Canceled,
}

/// Classifies a ride that vanished from the active poll: completed if the
/// pickup was reached (`completed_at` set on stop point 0), canceled
/// otherwise.
pub fn classify_disappearance(previous: &RideSnapshot) -> Disappearance {
    match previous.pickup() {
        Some(pickup) if pickup.completed_at.is_some() => Disappearance::Completed,
        _ => Disappearance::Canceled,
    }
}

/// A proposed ride awaiting rider confirmation. Session-only: exists
/// between creation and confirmation, cancellation, or expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct RideOffer {
    pub id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub pickup_eta: Option<DateTime<Utc>>,
    pub dropoff_eta: Option<DateTime<Utc>>,
    pub price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stop(state: StopPointState, completed_at: Option<DateTime<Utc>>) -> StopPoint {
        StopPoint {
            id: None,
            kind: None,
            state,
            description: None,
            lat: None,
            lng: None,
            eta: None,
            polyline: None,
            completed_at,
        }
    }

    fn snapshot(stop_points: Vec<StopPoint>) -> RideSnapshot {
        RideSnapshot {
            id: None,
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

    #[test]
    fn disappearance_is_completed_when_pickup_was_reached() {
        let reached = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let previous = snapshot(vec![
            stop(StopPointState::Completed, Some(reached)),
            stop(StopPointState::Pending, None),
        ]);
        assert_eq!(classify_disappearance(&previous), Disappearance::Completed);
    }

    #[test]
    fn disappearance_is_canceled_when_pickup_was_not_reached() {
        let previous = snapshot(vec![
            stop(StopPointState::Pending, None),
            stop(StopPointState::Pending, None),
        ]);
        assert_eq!(classify_disappearance(&previous), Disappearance::Canceled);
    }

    #[test]
    fn disappearance_without_stop_points_is_canceled() {
        let previous = snapshot(vec![]);
        assert_eq!(classify_disappearance(&previous), Disappearance::Canceled);
    }

    #[test]
    fn active_stop_point_is_first_pending() {
        let reached = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut first = stop(StopPointState::Completed, Some(reached));
        first.id = Some("pickup".into());
        let mut second = stop(StopPointState::Pending, None);
        second.id = Some("dropoff".into());

        let snapshot = snapshot(vec![first, second]);
        assert_eq!(
            snapshot.active_stop_point().and_then(|sp| sp.id.as_deref()),
            Some("dropoff")
        );
    }
}
