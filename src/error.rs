use thiserror::Error;

pub const GENERIC_FETCH_MESSAGE: &str = "Failed to load available slots. Please try again.";
pub const GENERIC_BOOKING_MESSAGE: &str = "Failed to book meeting. Please try again.";
pub const GENERIC_CONTACT_MESSAGE: &str = "Failed to send message. Please try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request failed with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl ApiError {
    /// Text shown to the user. A message supplied by the server wins.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Text shown when loading slots fails for good.
    pub fn fetch_message(&self) -> String {
        match self {
            ApiError::Status { message: None, .. } => GENERIC_FETCH_MESSAGE.to_string(),
            other => other.user_message(),
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Please select a time slot before submitting.")]
    NoSlotSelected,

    #[error("{0}")]
    InvalidContact(String),

    #[error("A booking is already being submitted.")]
    SubmissionInProgress,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<validator::ValidationErrors> for BookingError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid {field}."),
                })
            })
            .collect();
        messages.sort();
        BookingError::InvalidContact(messages.join(" "))
    }
}
