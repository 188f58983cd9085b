//! Performance benchmarks for ride_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ride_core::config::SyncConfig;
use ride_core::events::UiEvents;
use ride_core::polyline;
use ride_core::ride::LatLng;
use ride_core::state::{CurrentRide, FutureRides, WallClock};
use ride_core::systems::poll::apply_poll;
use ride_core::test_helpers::{active_response, pending_stop, wire_ride};

fn bench_apply_poll(c: &mut Criterion) {
    let config = SyncConfig::default();
    let now = WallClock::default().now();

    c.bench_function("apply_poll_with_route", |b| {
        b.iter(|| {
            let mut ride = CurrentRide::default();
            let mut future = FutureRides::default();
            let mut events = UiEvents::default();

            let mut pickup = pending_stop("sp-1");
            pickup.polyline = Some("_ibE_seK_seK_seK".to_string());
            let response = active_response(Some(wire_ride(
                "ride-1",
                vec![pickup, pending_stop("sp-2")],
            )));

            apply_poll(
                black_box(response),
                now,
                &config,
                &mut ride,
                &mut future,
                &mut events,
            );
            black_box(events.drain())
        });
    });
}

fn bench_polyline_decode(c: &mut Criterion) {
    let line: Vec<LatLng> = (0..500)
        .map(|i| LatLng {
            latitude: 52.0 + i as f64 * 1e-4,
            longitude: 13.0 + i as f64 * 2e-4,
        })
        .collect();
    let encoded = polyline::encode(&line);

    c.bench_function("polyline_decode_500_points", |b| {
        b.iter(|| polyline::decode(black_box(&encoded)));
    });
}

criterion_group!(benches, bench_apply_poll, bench_polyline_decode);
criterion_main!(benches);
