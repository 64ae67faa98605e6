use crate::{
    backend::BookingApi,
    error::ApiError,
    types::{BookingRequest, ContactRequest, MessageResponse, Slot, SlotTime},
};
use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::time::sleep;

/// Slot with labels derived from its timestamp as read in UTC.
pub fn slot(datetime: &str, available: bool, booked: bool) -> Slot {
    let datetime = SlotTime::parse(datetime).unwrap();
    let local = datetime.local_in(&Utc);
    Slot {
        date: local.format("%Y-%m-%d").to_string(),
        day: Some(local.format("%A").to_string()),
        day_short: local.format("%a").to_string(),
        time: local.format("%I:%M %p").to_string(),
        display: local.format("%A, %B %d at %I:%M %p").to_string(),
        datetime,
        available,
        booked,
    }
}

pub struct ScriptedBookingApiInner {
    pub calls_to_available_slots: AtomicU64,
    pub calls_to_book_meeting: AtomicU64,
    pub calls_to_submit_contact: AtomicU64,
    pub calls_to_run_diagnostics: AtomicU64,
    /// Consumed front to back; an empty script answers with `fallback_slots`.
    pub slot_responses: Mutex<VecDeque<Result<Vec<Slot>, ApiError>>>,
    pub fallback_slots: Mutex<Vec<Slot>>,
    pub booking_response: Mutex<Result<MessageResponse, ApiError>>,
    pub booking_requests: Mutex<Vec<BookingRequest>>,
    pub contact_requests: Mutex<Vec<ContactRequest>>,
    pub latency: Mutex<Duration>,
    /// Per-call latency of `available_slots`, consumed like `slot_responses`;
    /// once empty every call waits `latency`.
    pub slot_latencies: Mutex<VecDeque<Duration>>,
    pub booking_latency: Mutex<Duration>,
}

#[derive(Clone)]
pub struct ScriptedBookingApi(pub Arc<ScriptedBookingApiInner>);

impl ScriptedBookingApiInner {
    fn new() -> Self {
        Self {
            calls_to_available_slots: AtomicU64::default(),
            calls_to_book_meeting: AtomicU64::default(),
            calls_to_submit_contact: AtomicU64::default(),
            calls_to_run_diagnostics: AtomicU64::default(),
            slot_responses: Mutex::default(),
            fallback_slots: Mutex::default(),
            booking_response: Mutex::new(Ok(MessageResponse::default())),
            booking_requests: Mutex::default(),
            contact_requests: Mutex::default(),
            latency: Mutex::new(Duration::ZERO),
            slot_latencies: Mutex::default(),
            booking_latency: Mutex::new(Duration::ZERO),
        }
    }
}

impl ScriptedBookingApi {
    pub fn new() -> Self {
        Self(Arc::new(ScriptedBookingApiInner::new()))
    }

    pub fn push_slots(&self, response: Result<Vec<Slot>, ApiError>) -> &Self {
        self.0.slot_responses.lock().unwrap().push_back(response);
        self
    }

    pub fn set_fallback_slots(&self, slots: Vec<Slot>) {
        *self.0.fallback_slots.lock().unwrap() = slots;
    }

    pub fn set_booking_response(&self, response: Result<MessageResponse, ApiError>) {
        *self.0.booking_response.lock().unwrap() = response;
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.0.latency.lock().unwrap() = latency;
    }

    pub fn push_slot_latency(&self, latency: Duration) -> &Self {
        self.0.slot_latencies.lock().unwrap().push_back(latency);
        self
    }

    pub fn set_booking_latency(&self, latency: Duration) {
        *self.0.booking_latency.lock().unwrap() = latency;
    }

    pub fn slot_calls(&self) -> u64 {
        self.0.calls_to_available_slots.load(Ordering::SeqCst)
    }

    pub fn booking_calls(&self) -> u64 {
        self.0.calls_to_book_meeting.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookingApi for ScriptedBookingApi {
    async fn available_slots(&self) -> Result<Vec<Slot>, ApiError> {
        self.0
            .calls_to_available_slots
            .fetch_add(1, Ordering::SeqCst);
        // Answer and delay are picked when the call starts, so overlapping
        // calls keep the order they were made in.
        let scripted = self.0.slot_responses.lock().unwrap().pop_front();
        let response =
            scripted.unwrap_or_else(|| Ok(self.0.fallback_slots.lock().unwrap().clone()));
        let latency = self
            .0
            .slot_latencies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| *self.0.latency.lock().unwrap());
        if !latency.is_zero() {
            sleep(latency).await;
        }
        response
    }

    async fn book_meeting(&self, request: BookingRequest) -> Result<MessageResponse, ApiError> {
        self.0.calls_to_book_meeting.fetch_add(1, Ordering::SeqCst);
        self.0.booking_requests.lock().unwrap().push(request);
        let latency = *self.0.booking_latency.lock().unwrap();
        if !latency.is_zero() {
            sleep(latency).await;
        }
        self.0.booking_response.lock().unwrap().clone()
    }

    async fn submit_contact(&self, request: ContactRequest) -> Result<MessageResponse, ApiError> {
        self.0
            .calls_to_submit_contact
            .fetch_add(1, Ordering::SeqCst);
        self.0.contact_requests.lock().unwrap().push(request);
        Ok(MessageResponse::default())
    }

    async fn run_diagnostics(&self) {
        self.0
            .calls_to_run_diagnostics
            .fetch_add(1, Ordering::SeqCst);
    }
}
