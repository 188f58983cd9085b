//! Blocking HTTP implementation of [RideApi] against the ride backend REST
//! API (`…/api/v1` base).

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::wire::{
    ActiveRideResponse, PreRideDetails, RideEnvelope, RideRequestBody, RidesEnvelope, WireLocation,
    WireOffer, WireRide,
};
use super::{ApiError, CreateOutcome, RideApi, RiderProfile};
use crate::ride::RideState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Thin blocking client for the ride backend.
#[derive(Debug, Clone)]
pub struct HttpRideApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRideApi {
    /// Create a client for the given API base (e.g. `http://localhost:8000/api/v1`).
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build ride API client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        response
            .error_for_status()
            .map_err(|err| ApiError::Api(err.to_string()))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.send(self.client.get(self.url(path)).query(query))?;
        response.json().map_err(|err| ApiError::Json(err.to_string()))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(self.client.post(self.url(path)).json(body))?;
        response.json().map_err(|err| ApiError::Json(err.to_string()))
    }
}

impl RideApi for HttpRideApi {
    fn active_ride(&self) -> Result<ActiveRideResponse, ApiError> {
        self.get_json("me/rides/active", &[("activeRide", "true".to_string())])
    }

    fn create_ride(&self, request: &RideRequestBody) -> Result<CreateOutcome<WireRide>, ApiError> {
        let ride: WireRide = self.post_json("me/rides", request)?;
        if ride.state == RideState::Rejected {
            return Ok(CreateOutcome::Rejected);
        }
        Ok(CreateOutcome::Created(ride))
    }

    fn create_offer(
        &self,
        request: &RideRequestBody,
    ) -> Result<CreateOutcome<WireOffer>, ApiError> {
        let offer: WireOffer = self.post_json("me/rides/offer", request)?;
        if offer.state.as_deref() == Some("rejected") {
            return Ok(CreateOutcome::Rejected);
        }
        Ok(CreateOutcome::Created(offer))
    }

    fn cancel_active_ride(&self) -> Result<Option<WireRide>, ApiError> {
        let envelope: RideEnvelope =
            self.post_json("me/rides/cancel-active-ride", &serde_json::json!({}))?;
        Ok(envelope.ride)
    }

    fn cancel_future_ride(&self, ride_id: &str) -> Result<Option<WireRide>, ApiError> {
        let envelope: RideEnvelope = self.post_json(
            "me/rides/cancel-future-ride",
            &serde_json::json!({ "rideId": ride_id }),
        )?;
        Ok(envelope.ride)
    }

    fn pre_ride_details(
        &self,
        origin: &WireLocation,
        destination: &WireLocation,
    ) -> Result<PreRideDetails, ApiError> {
        // The backend expects each endpoint as a JSON-encoded query value.
        let origin = serde_json::to_string(origin)
            .map_err(|err| ApiError::Json(err.to_string()))?;
        let destination = serde_json::to_string(destination)
            .map_err(|err| ApiError::Json(err.to_string()))?;
        self.get_json(
            "me/rides/pre",
            &[("origin", origin), ("destination", destination)],
        )
    }

    fn ride_history(&self) -> Result<Vec<WireRide>, ApiError> {
        let envelope: RidesEnvelope = self.get_json("me/rides/history", &[])?;
        Ok(envelope.rides)
    }

    fn rate_ride(&self, external_id: &str, rating: u8) -> Result<Option<WireRide>, ApiError> {
        let envelope: RideEnvelope = self.post_json(
            "me/rides/rating",
            &serde_json::json!({ "externalId": external_id, "rating": rating }),
        )?;
        Ok(envelope.ride)
    }

    fn profile(&self) -> Result<RiderProfile, ApiError> {
        self.get_json("me", &[])
    }
}
