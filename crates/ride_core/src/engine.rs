//! Engine runner: advances the clock and routes ticks into the schedule.
//!
//! Clock progression happens here, outside systems. Each step pops the
//! next tick from [SyncClock], inserts it as [CurrentTick], then runs the
//! schedule. A tick runs to completion before the next one pops, so polls
//! are serialized by construction and snapshots apply in issuance order.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentTick, SyncClock, Tick, TickKind};
use crate::systems::{
    offer_expiry::offer_expiry_system, poll::poll_system, profile_refresh::profile_refresh_system,
};

// Condition functions for each tick kind
fn is_poll(tick: Option<Res<CurrentTick>>) -> bool {
    tick.map(|t| t.0.kind == TickKind::Poll).unwrap_or(false)
}

fn is_profile_refresh(tick: Option<Res<CurrentTick>>) -> bool {
    tick.map(|t| t.0.kind == TickKind::ProfileRefresh)
        .unwrap_or(false)
}

fn is_offer_expiry(tick: Option<Res<CurrentTick>>) -> bool {
    tick.map(|t| t.0.kind == TickKind::OfferExpiry)
        .unwrap_or(false)
}

/// Builds the sync schedule: each system runs only for its tick kind.
pub fn sync_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        poll_system.run_if(is_poll),
        profile_refresh_system.run_if(is_profile_refresh),
        offer_expiry_system.run_if(is_offer_expiry),
    ));
    schedule
}

/// Runs one step: pops the next tick, inserts it as [CurrentTick], runs
/// the schedule. Returns `false` when no tick is due.
pub fn run_next_tick(world: &mut World, schedule: &mut Schedule) -> bool {
    let tick = match world.resource_mut::<SyncClock>().pop_next() {
        Some(tick) => tick,
        None => return false,
    };
    world.insert_resource(CurrentTick(tick));
    schedule.run(world);
    true
}

/// Runs one step and invokes `hook` after the schedule completes.
pub fn run_next_tick_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Tick),
{
    let tick = match world.resource_mut::<SyncClock>().pop_next() {
        Some(tick) => tick,
        None => return false,
    };
    world.insert_resource(CurrentTick(tick));
    schedule.run(world);
    hook(world, &tick);
    true
}

/// Runs every tick due at or before `deadline_ms`. Returns the number of
/// ticks processed.
pub fn run_until(world: &mut World, schedule: &mut Schedule, deadline_ms: u64) -> usize {
    let mut steps = 0;
    loop {
        let due = world
            .resource::<SyncClock>()
            .next_tick_time()
            .map(|ts| ts <= deadline_ms)
            .unwrap_or(false);
        if !due || !run_next_tick(world, schedule) {
            return steps;
        }
        steps += 1;
    }
}
