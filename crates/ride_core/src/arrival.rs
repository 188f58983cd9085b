//! Driver-arrival presentation state, computed as pure functions of a stop
//! point, the reminder threshold, and the wall clock.

use chrono::{DateTime, Utc};

use crate::ride::StopPoint;

/// Whole minutes until the stop point's ETA; zero or negative once due.
pub fn pickup_eta_minutes(stop: &StopPoint, now: DateTime<Utc>) -> Option<i64> {
    stop.eta.map(|eta| (eta - now).num_minutes())
}

/// Whether driver-arrival details should be shown prominently: always once
/// the stop was reached, otherwise when the ETA is inside the reminder
/// threshold.
pub fn display_match_info(stop: &StopPoint, reminder_min: i64, now: DateTime<Utc>) -> bool {
    if stop.completed_at.is_some() {
        return true;
    }
    match pickup_eta_minutes(stop, now) {
        Some(minutes) => minutes <= reminder_min,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::ride::StopPointState;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn stop_with_eta(eta: Option<DateTime<Utc>>) -> StopPoint {
        StopPoint {
            id: None,
            kind: None,
            state: StopPointState::Pending,
            description: None,
            lat: None,
            lng: None,
            eta,
            polyline: None,
            completed_at: None,
        }
    }

    #[test]
    fn eta_within_threshold_displays_match_info() {
        let stop = stop_with_eta(Some(now() + Duration::minutes(4)));
        assert!(display_match_info(&stop, 5, now()));
        assert_eq!(pickup_eta_minutes(&stop, now()), Some(4));
    }

    #[test]
    fn eta_beyond_threshold_does_not_display_match_info() {
        let stop = stop_with_eta(Some(now() + Duration::minutes(10)));
        assert!(!display_match_info(&stop, 5, now()));
        assert_eq!(pickup_eta_minutes(&stop, now()), Some(10));
    }

    #[test]
    fn completed_stop_always_displays_match_info() {
        let mut stop = stop_with_eta(None);
        stop.completed_at = Some(now());
        assert!(display_match_info(&stop, 5, now()));
    }

    #[test]
    fn missing_eta_does_not_display_match_info() {
        let stop = stop_with_eta(None);
        assert!(!display_match_info(&stop, 5, now()));
        assert_eq!(pickup_eta_minutes(&stop, now()), None);
    }

    #[test]
    fn overdue_eta_displays_match_info() {
        let stop = stop_with_eta(Some(now() - Duration::minutes(2)));
        assert!(display_match_info(&stop, 5, now()));
    }
}
