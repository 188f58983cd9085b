//! Terminal companion for the ride backend: drives a rider session in
//! real time and prints the events the engine emits, plus one-shot
//! commands for history, booking, rating and cancellation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use ride_core::api::http::HttpRideApi;
use ride_core::booking::{BookingError, LocationPick};
use ride_core::config::SyncConfig;
use ride_core::events::UiEvent;
use ride_core::ride::{RideSnapshot, RideType};
use ride_core::session::RideSession;

#[derive(Parser)]
#[command(name = "ride-console", about = "Terminal companion for the ride backend")]
struct Cli {
    /// API base, e.g. http://localhost:8000/api/v1
    #[arg(long, default_value = "http://localhost:8000/api/v1")]
    base_url: String,

    /// Bearer token for authenticated endpoints.
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow the active ride and print sync events as they arrive.
    Monitor,
    /// List completed rides, newest first.
    History,
    /// Request a ride and follow it.
    Book {
        #[arg(long)]
        pickup_address: String,
        #[arg(long)]
        pickup_lat: f64,
        #[arg(long)]
        pickup_lng: f64,
        #[arg(long)]
        dropoff_address: String,
        #[arg(long)]
        dropoff_lat: f64,
        #[arg(long)]
        dropoff_lng: f64,
        #[arg(long, default_value_t = 1)]
        passengers: u8,
        /// Book a private ride instead of a pool one.
        #[arg(long)]
        private: bool,
    },
    /// Rate a completed ride by its external id.
    Rate {
        #[arg(long)]
        ride: String,
        #[arg(long)]
        rating: u8,
    },
    /// Cancel the active ride.
    Cancel,
}

fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let mut api = HttpRideApi::new(&cli.base_url);
    if let Some(token) = &cli.token {
        api = api.with_token(token);
    }
    let mut session = RideSession::new(Arc::new(api), SyncConfig::default());

    match cli.command {
        Command::Monitor => monitor(&mut session),
        Command::History => history(&session),
        Command::Book {
            pickup_address,
            pickup_lat,
            pickup_lng,
            dropoff_address,
            dropoff_lat,
            dropoff_lng,
            passengers,
            private,
        } => {
            session.set_pickup(LocationPick::new(&pickup_address, pickup_lat, pickup_lng));
            session.set_dropoff(LocationPick::new(&dropoff_address, dropoff_lat, dropoff_lng));
            session.set_passengers(passengers);
            if private {
                session.set_ride_type(RideType::Private);
            }
            book(&mut session);
        }
        Command::Rate { ride, rating } => match session.rate_ride(&ride, rating) {
            Ok(()) => println!("rated ride {ride}: {rating}"),
            Err(err) => fail(&format!("rating failed: {err:?}")),
        },
        Command::Cancel => match session.cancel_active_ride() {
            Ok(()) => println!("active ride canceled"),
            Err(err) => fail(&format!("cancellation failed: {err:?}")),
        },
    }
}

/// Pumps the session's virtual clock against wall time until it goes idle.
fn monitor(session: &mut RideSession) {
    session.start();
    let origin = Instant::now();

    loop {
        session.run_until(origin.elapsed().as_millis() as u64);
        for event in session.drain_events() {
            print_event(session, &event);
        }
        match session.next_tick_at() {
            Some(due) => {
                let elapsed = origin.elapsed().as_millis() as u64;
                if due > elapsed {
                    std::thread::sleep(Duration::from_millis(due - elapsed));
                }
            }
            None => break,
        }
    }
}

fn book(session: &mut RideSession) {
    match session.create_ride() {
        Ok(()) => {
            println!("ride requested, waiting for a match");
            monitor(session);
        }
        Err(BookingError::Validation(message)) => fail(message),
        Err(BookingError::Rejected) => fail("the backend rejected this ride request"),
        Err(BookingError::Api(err)) => fail(&format!("booking failed: {err:?}")),
    }
}

fn history(session: &RideSession) {
    match session.ride_history() {
        Ok(rides) if rides.is_empty() => println!("no completed rides yet"),
        Ok(rides) => {
            for ride in rides {
                println!("{}", describe_ride(&ride));
            }
        }
        Err(err) => fail(&format!("failed to load ride history: {err:?}")),
    }
}

fn print_event(session: &RideSession, event: &UiEvent) {
    match event {
        UiEvent::SnapshotUpdated(Some(snapshot)) => {
            let eta = session
                .pickup_eta_min()
                .map(|min| format!(", pickup in {min} min"))
                .unwrap_or_default();
            println!("{}{}", describe_ride(snapshot), eta);
        }
        UiEvent::SnapshotUpdated(None) => println!("no active ride"),
        UiEvent::RecenterMap => println!("route updated"),
        UiEvent::RideCompleted => println!("ride completed"),
        UiEvent::RideCanceled => println!("ride canceled"),
        UiEvent::OfferExpired => println!("offer expired"),
    }
}

fn describe_ride(ride: &RideSnapshot) -> String {
    let endpoint = |stop: Option<&ride_core::ride::StopPoint>| {
        stop.and_then(|sp| sp.description.clone())
            .unwrap_or_else(|| "?".to_string())
    };
    format!(
        "[{:?}] {} -> {}",
        ride.state,
        endpoint(ride.pickup()),
        endpoint(ride.dropoff()),
    )
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}
