//! Profile refresh tick, independent of the ride poll. Failures are
//! logged and swallowed; the stale profile stays in place.

use bevy_ecs::prelude::{Res, ResMut};
use tracing::debug;

use crate::api::ApiHandle;
use crate::clock::{CurrentTick, SyncClock, TickKind};
use crate::config::SyncConfig;
use crate::state::ProfileState;

pub fn profile_refresh_system(
    tick: Res<CurrentTick>,
    mut clock: ResMut<SyncClock>,
    config: Res<SyncConfig>,
    api: Res<ApiHandle>,
    mut profile: ResMut<ProfileState>,
) {
    if tick.0.kind != TickKind::ProfileRefresh {
        return;
    }

    clock.schedule_in(config.profile_refresh_interval_ms, TickKind::ProfileRefresh);

    match api.0.profile() {
        Ok(fresh) => profile.0 = Some(fresh),
        Err(err) => debug!(?err, "profile refresh failed; keeping stale profile"),
    }
}
