use crate::{
    backend::BookingApi,
    error::{BookingError, GENERIC_BOOKING_MESSAGE},
    types::{BookingRequest, Slot},
};
use tracing::{info, warn};
use validator::Validate;

pub const DEFAULT_BOOKING_CONFIRMATION: &str = "Meeting request submitted successfully!";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
}

/// The chosen slot and the contact details entered for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<Slot>,
    pub contact: ContactFields,
}

impl SelectionState {
    pub fn selected(&self) -> Option<&Slot> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, slot: &Slot) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|selected| selected.datetime == slot.datetime)
    }

    /// Replaces the selection when `slot` can be booked. Returns whether it did.
    pub fn select(&mut self, slot: &Slot) -> bool {
        if !slot.is_selectable() {
            return false;
        }
        self.selected = Some(slot.clone());
        true
    }

    /// Builds the request for the current selection. Nothing is sent when this fails.
    pub fn booking_request(&self) -> Result<BookingRequest, BookingError> {
        let slot = self.selected.as_ref().ok_or(BookingError::NoSlotSelected)?;
        let request = BookingRequest {
            name: self.contact.name.trim().to_string(),
            email: self.contact.email.trim().to_string(),
            datetime: slot.datetime.as_str().to_string(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.contact = ContactFields::default();
    }
}

/// Sends a booking and returns the confirmation text to show.
pub async fn submit_booking<A>(api: &A, request: BookingRequest) -> Result<String, BookingError>
where
    A: BookingApi + ?Sized,
{
    let datetime = request.datetime.clone();
    match api.book_meeting(request).await {
        Ok(response) => {
            info!(%datetime, "Meeting booked");
            Ok(response
                .message
                .unwrap_or_else(|| DEFAULT_BOOKING_CONFIRMATION.to_string()))
        }
        Err(err) => {
            warn!(?err, %datetime, "Booking rejected");
            Err(err.into())
        }
    }
}

/// Text shown for a failed submission.
pub fn failure_message(err: &BookingError) -> String {
    match err {
        BookingError::Api(api_err) => api_err
            .server_message()
            .unwrap_or(GENERIC_BOOKING_MESSAGE)
            .to_string(),
        other => other.to_string(),
    }
}
