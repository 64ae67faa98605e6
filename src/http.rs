use crate::backend::BookingApi;
use crate::error::ApiError;
use crate::types::{BookingRequest, ContactRequest, MessageResponse, Slot, SlotsResponse};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, warn};

pub const AVAILABLE_SLOTS_PATH: &str = "/api/available-slots";
pub const BOOK_MEETING_PATH: &str = "/book-meeting";
pub const CONTACT_PATH: &str = "/contact";
pub const DEBUG_HEADERS_PATH: &str = "/debug/headers";

#[derive(Clone)]
pub struct HttpBookingApi {
    client: Client,
    base_url: String,
}

impl HttpBookingApi {
    pub fn new(base_url: &str, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(?err, "Failed to build configured HTTP client, using defaults");
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        decode(response).await
    }

    async fn post_json<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        decode(response).await
    }

    async fn probe(&self, path: &str) {
        let url = self.url(path);
        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                debug!(%url, %status, body_len = body.len(), "Diagnostic response");
            }
            Err(err) => error!(?err, %url, "Diagnostic request failed"),
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<MessageResponse>(&body)
            .ok()
            .and_then(|payload| payload.message);
        warn!(%status, ?message, "Booking API returned an error status");
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|err| ApiError::MalformedPayload(err.to_string()))
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn available_slots(&self) -> Result<Vec<Slot>, ApiError> {
        let response: SlotsResponse = self.get_json(AVAILABLE_SLOTS_PATH).await?;
        debug!(slots = response.slots.len(), "Received available slots");
        Ok(response.slots)
    }

    async fn book_meeting(&self, request: BookingRequest) -> Result<MessageResponse, ApiError> {
        self.post_json(BOOK_MEETING_PATH, &request).await
    }

    async fn submit_contact(&self, request: ContactRequest) -> Result<MessageResponse, ApiError> {
        self.post_json(CONTACT_PATH, &request).await
    }

    async fn run_diagnostics(&self) {
        debug!("Running diagnostic checks");
        self.probe(DEBUG_HEADERS_PATH).await;
        self.probe(AVAILABLE_SLOTS_PATH).await;
    }
}
