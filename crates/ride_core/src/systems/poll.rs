//! Poll tick: fetch the active ride and reconcile local state with it.
//!
//! The backend is the source of truth; each applied poll replaces the
//! local snapshot wholesale. A failed fetch or an undecodable payload
//! skips the tick without touching state; the next scheduled poll is the
//! retry mechanism.

use bevy_ecs::prelude::{Res, ResMut};
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::api::wire::{decode_ride, ActiveRideResponse};
use crate::api::ApiHandle;
use crate::arrival::{display_match_info, pickup_eta_minutes};
use crate::clock::{CurrentTick, SyncClock, TickKind};
use crate::config::SyncConfig;
use crate::events::{UiEvent, UiEvents};
use crate::ride::{classify_disappearance, Disappearance, RideSnapshot};
use crate::state::{CurrentRide, FutureRides, WallClock};

pub fn poll_system(
    tick: Res<CurrentTick>,
    mut clock: ResMut<SyncClock>,
    config: Res<SyncConfig>,
    api: Res<ApiHandle>,
    wall: Res<WallClock>,
    mut ride: ResMut<CurrentRide>,
    mut future: ResMut<FutureRides>,
    mut events: ResMut<UiEvents>,
) {
    if tick.0.kind != TickKind::Poll {
        return;
    }

    clock.schedule_in(config.poll_interval_ms, TickKind::Poll);

    let response = match api.0.active_ride() {
        Ok(response) => response,
        Err(err) => {
            warn!(?err, "active ride poll failed; retrying on the next tick");
            return;
        }
    };

    apply_poll(
        response,
        wall.now(),
        &config,
        &mut ride,
        &mut future,
        &mut events,
    );
}

/// Applies one successful poll response. Events within the tick keep a
/// fixed order: a disappearance emits the transition event before the null
/// snapshot update; a present ride emits the snapshot update before the
/// recenter signal.
pub fn apply_poll(
    response: ActiveRideResponse,
    now: DateTime<Utc>,
    config: &SyncConfig,
    ride: &mut CurrentRide,
    future: &mut FutureRides,
    events: &mut UiEvents,
) {
    let snapshot = match response.ride.map(decode_ride).transpose() {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(?err, "discarding undecodable active ride payload");
            return;
        }
    };
    let future_rides = match response
        .future_rides
        .into_iter()
        .map(decode_ride)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(rides) => rides,
        Err(err) => {
            warn!(?err, "discarding undecodable future ride payload");
            return;
        }
    };

    match snapshot {
        Some(snapshot) => {
            let recenter = match &ride.snapshot {
                None => true,
                Some(previous) => {
                    previous.state != snapshot.state
                        || active_stop_id(previous) != active_stop_id(&snapshot)
                }
            };

            events.push(UiEvent::SnapshotUpdated(Some(snapshot.clone())));
            if recenter {
                events.push(UiEvent::RecenterMap);
            }

            match snapshot.pickup() {
                Some(pickup) => {
                    ride.pickup_eta_min = pickup_eta_minutes(pickup, now);
                    ride.display_match_info =
                        display_match_info(pickup, config.arrive_reminder_min, now);
                }
                None => {
                    ride.pickup_eta_min = None;
                    ride.display_match_info = false;
                }
            }
            ride.snapshot = Some(snapshot);
        }
        None => {
            if let Some(previous) = ride.snapshot.take() {
                match classify_disappearance(&previous) {
                    Disappearance::Completed => events.push(UiEvent::RideCompleted),
                    Disappearance::Canceled => events.push(UiEvent::RideCanceled),
                }
                events.push(UiEvent::SnapshotUpdated(None));
            }
            ride.pickup_eta_min = None;
            ride.display_match_info = false;
        }
    }

    future.0 = future_rides;
}

fn active_stop_id(snapshot: &RideSnapshot) -> Option<&str> {
    snapshot.active_stop_point().and_then(|sp| sp.id.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::ride::LatLng;
    use crate::test_helpers::{active_response, completed_stop, pending_stop, wire_ride};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn apply(
        response: ActiveRideResponse,
        ride: &mut CurrentRide,
        future: &mut FutureRides,
        events: &mut UiEvents,
    ) {
        apply_poll(response, now(), &SyncConfig::default(), ride, future, events);
    }

    #[test]
    fn first_snapshot_decodes_route_and_recenters() {
        let mut ride = CurrentRide::default();
        let mut future = FutureRides::default();
        let mut events = UiEvents::default();

        let mut pickup = pending_stop("sp-1");
        pickup.polyline = Some("_ibE_seK_seK_seK".to_string());
        let response = active_response(Some(wire_ride(
            "ride-1",
            vec![pickup, pending_stop("sp-2")],
        )));

        apply(response, &mut ride, &mut future, &mut events);

        let snapshot = ride.snapshot.as_ref().expect("snapshot");
        assert_eq!(
            snapshot.pickup().and_then(|sp| sp.polyline.clone()),
            Some(vec![
                LatLng {
                    latitude: 1.0,
                    longitude: 2.0
                },
                LatLng {
                    latitude: 3.0,
                    longitude: 4.0
                },
            ])
        );

        let drained = events.drain();
        assert!(matches!(drained[0], UiEvent::SnapshotUpdated(Some(_))));
        assert_eq!(drained[1], UiEvent::RecenterMap);
        assert_eq!(drained.len(), 2);
    }

    #[test]
    fn unchanged_ride_does_not_recenter_again() {
        let mut ride = CurrentRide::default();
        let mut future = FutureRides::default();
        let mut events = UiEvents::default();

        let response =
            active_response(Some(wire_ride("ride-1", vec![pending_stop("sp-1")])));
        apply(response.clone(), &mut ride, &mut future, &mut events);
        events.drain();

        apply(response, &mut ride, &mut future, &mut events);
        let drained = events.drain();
        assert!(matches!(drained[0], UiEvent::SnapshotUpdated(Some(_))));
        assert_eq!(drained.len(), 1);
    }

    #[test]
    fn active_stop_change_recenters() {
        let mut ride = CurrentRide::default();
        let mut future = FutureRides::default();
        let mut events = UiEvents::default();

        apply(
            active_response(Some(wire_ride(
                "ride-1",
                vec![pending_stop("sp-1"), pending_stop("sp-2")],
            ))),
            &mut ride,
            &mut future,
            &mut events,
        );
        events.drain();

        // Pickup reached; the dropoff becomes the active stop point.
        apply(
            active_response(Some(wire_ride(
                "ride-1",
                vec![completed_stop("sp-1", now()), pending_stop("sp-2")],
            ))),
            &mut ride,
            &mut future,
            &mut events,
        );

        let drained = events.drain();
        assert!(drained.contains(&UiEvent::RecenterMap));
    }

    #[test]
    fn disappearance_after_pickup_is_completed_exactly_once() {
        let mut ride = CurrentRide::default();
        let mut future = FutureRides::default();
        let mut events = UiEvents::default();

        apply(
            active_response(Some(wire_ride(
                "ride-1",
                vec![completed_stop("sp-1", now()), pending_stop("sp-2")],
            ))),
            &mut ride,
            &mut future,
            &mut events,
        );
        events.drain();

        apply(active_response(None), &mut ride, &mut future, &mut events);
        let drained = events.drain();
        assert_eq!(
            drained,
            vec![UiEvent::RideCompleted, UiEvent::SnapshotUpdated(None)]
        );
        assert!(ride.snapshot.is_none());

        // A second empty poll emits nothing: the transition already fired.
        apply(active_response(None), &mut ride, &mut future, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn disappearance_before_pickup_is_canceled() {
        let mut ride = CurrentRide::default();
        let mut future = FutureRides::default();
        let mut events = UiEvents::default();

        apply(
            active_response(Some(wire_ride(
                "ride-1",
                vec![pending_stop("sp-1"), pending_stop("sp-2")],
            ))),
            &mut ride,
            &mut future,
            &mut events,
        );
        events.drain();

        apply(active_response(None), &mut ride, &mut future, &mut events);
        let drained = events.drain();
        assert_eq!(
            drained,
            vec![UiEvent::RideCanceled, UiEvent::SnapshotUpdated(None)]
        );
    }

    #[test]
    fn undecodable_payload_leaves_state_untouched() {
        let mut ride = CurrentRide::default();
        let mut future = FutureRides::default();
        let mut events = UiEvents::default();

        apply(
            active_response(Some(wire_ride("ride-1", vec![pending_stop("sp-1")]))),
            &mut ride,
            &mut future,
            &mut events,
        );
        events.drain();

        let mut broken = pending_stop("sp-1");
        broken.polyline = Some("_".to_string());
        apply(
            active_response(Some(wire_ride("ride-1", vec![broken]))),
            &mut ride,
            &mut future,
            &mut events,
        );

        assert!(events.is_empty());
        assert!(ride.snapshot.is_some());
    }

    #[test]
    fn arrival_state_follows_pickup_eta() {
        let mut ride = CurrentRide::default();
        let mut future = FutureRides::default();
        let mut events = UiEvents::default();

        let mut pickup = pending_stop("sp-1");
        pickup.eta = Some(now() + Duration::minutes(4));
        apply(
            active_response(Some(wire_ride("ride-1", vec![pickup]))),
            &mut ride,
            &mut future,
            &mut events,
        );
        assert_eq!(ride.pickup_eta_min, Some(4));
        assert!(ride.display_match_info);

        let mut pickup = pending_stop("sp-1");
        pickup.eta = Some(now() + Duration::minutes(10));
        apply(
            active_response(Some(wire_ride("ride-1", vec![pickup]))),
            &mut ride,
            &mut future,
            &mut events,
        );
        assert_eq!(ride.pickup_eta_min, Some(10));
        assert!(!ride.display_match_info);
    }

    #[test]
    fn future_rides_are_stored() {
        let mut ride = CurrentRide::default();
        let mut future = FutureRides::default();
        let mut events = UiEvents::default();

        let mut response = active_response(None);
        response.future_rides = vec![wire_ride("ride-9", vec![pending_stop("sp-9")])];
        apply(response, &mut ride, &mut future, &mut events);

        assert_eq!(future.0.len(), 1);
        assert_eq!(future.0[0].id.as_deref(), Some("ride-9"));
    }
}
