use bevy_ecs::prelude::Resource;

/// Reference cadence: the active ride is polled every 5 seconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Rider profile refresh runs on its own 10-second tick.
const DEFAULT_PROFILE_REFRESH_INTERVAL_MS: u64 = 10_000;

/// A ride offer stays open for 10 seconds before it expires.
const DEFAULT_OFFER_TTL_MS: u64 = 10_000;

/// Delay before re-polling after a successful ride creation, giving the
/// backend time to run matching.
const DEFAULT_CREATE_SETTLE_DELAY_MS: u64 = 2_500;

/// `ARRIVE_REMINDER_MIN`: show driver-arrival details once the pickup ETA
/// is at or below this many minutes.
const DEFAULT_ARRIVE_REMINDER_MIN: i64 = 5;

/// `MAX_FUTURE_RIDES`: cap on scheduled future rides. Enforced by the
/// backend, carried here for display.
const DEFAULT_MAX_FUTURE_RIDES: usize = 3;

/// Engine cadence and presentation thresholds.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SyncConfig {
    pub poll_interval_ms: u64,
    pub profile_refresh_interval_ms: u64,
    pub offer_ttl_ms: u64,
    pub create_settle_delay_ms: u64,
    pub arrive_reminder_min: i64,
    pub max_future_rides: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            profile_refresh_interval_ms: DEFAULT_PROFILE_REFRESH_INTERVAL_MS,
            offer_ttl_ms: DEFAULT_OFFER_TTL_MS,
            create_settle_delay_ms: DEFAULT_CREATE_SETTLE_DELAY_MS,
            arrive_reminder_min: DEFAULT_ARRIVE_REMINDER_MIN,
            max_future_rides: DEFAULT_MAX_FUTURE_RIDES,
        }
    }
}

impl SyncConfig {
    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    pub fn with_profile_refresh_interval_ms(mut self, interval_ms: u64) -> Self {
        self.profile_refresh_interval_ms = interval_ms;
        self
    }

    pub fn with_offer_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.offer_ttl_ms = ttl_ms;
        self
    }

    pub fn with_arrive_reminder_min(mut self, minutes: i64) -> Self {
        self.arrive_reminder_min = minutes;
        self
    }
}
