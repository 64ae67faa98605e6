use crate::{
    error::ApiError,
    types::{BookingRequest, ContactRequest, MessageResponse, Slot},
};
use async_trait::async_trait;

/// Remote booking API as seen by the booking view.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingApi {
    async fn available_slots(&self) -> Result<Vec<Slot>, ApiError>;
    async fn book_meeting(&self, request: BookingRequest) -> Result<MessageResponse, ApiError>;
    async fn submit_contact(&self, request: ContactRequest) -> Result<MessageResponse, ApiError>;
    /// Issues the auxiliary diagnostic requests and logs what came back.
    async fn run_diagnostics(&self);
}
