//! State holder of the booking page.
//!
//! `BookingView` owns the slot list, the pivot date, the selection and the
//! notice shown to the user. Changes are published through a `watch` channel
//! so a front-end can re-render on every update. Fetch runs are spawned onto
//! the runtime and only keep a weak handle to the state: once the view is
//! gone their results are dropped.

use crate::{
    backend::BookingApi,
    calendar::{self, CalendarProjection, CalendarView, DateWindow, EmptyWindowAction},
    clock::Clock,
    configuration::Configuration,
    error::{BookingError, GENERIC_CONTACT_MESSAGE},
    selection::{self, SelectionState},
    slot_fetcher::{FetchOutcome, SlotFetcher},
    types::{ContactRequest, Slot},
};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::{sync::watch, task::JoinHandle};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use validator::Validate;

pub const TIMEOUT_MESSAGE: &str = "Fetching slots is taking too long. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
    /// Slot loading outlived the safety timer.
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    /// Slot loading problems come with a retry action.
    pub offers_retry: bool,
}

impl Notice {
    fn success(message: String) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Success!".into(),
            message,
            offers_retry: false,
        }
    }

    fn warning(title: &str, message: String) -> Self {
        Self {
            kind: NoticeKind::Warning,
            title: title.into(),
            message,
            offers_retry: false,
        }
    }

    fn error(message: String) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error".into(),
            message,
            offers_retry: false,
        }
    }

    fn fetch_failed(message: String) -> Self {
        Self {
            offers_retry: true,
            ..Self::error(message)
        }
    }

    fn timeout() -> Self {
        Self {
            kind: NoticeKind::Timeout,
            title: "Timeout".into(),
            message: TIMEOUT_MESSAGE.into(),
            offers_retry: true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == NoticeKind::Timeout
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingState {
    pub slots: Vec<Slot>,
    pub pivot: NaiveDate,
    pub view: CalendarView,
    pub selection: SelectionState,
    pub loading: bool,
    pub submitting: bool,
    pub notice: Option<Notice>,
}

impl BookingState {
    fn new(pivot: NaiveDate) -> Self {
        Self {
            slots: Vec::new(),
            pivot,
            view: CalendarView::Week,
            selection: SelectionState::default(),
            loading: false,
            submitting: false,
            notice: None,
        }
    }

    fn apply_fetch<Tz: chrono::TimeZone>(&mut self, outcome: FetchOutcome, zone: &Tz) {
        match outcome {
            FetchOutcome::Loaded(slots) => {
                self.loading = false;
                if self.notice.as_ref().is_some_and(Notice::is_timeout) {
                    self.notice = None;
                }
                if let Some(first) = slots.first() {
                    let local = first.datetime.local_in(zone);
                    let window = DateWindow::for_view(self.view, self.pivot);
                    if !window.contains_local(local) {
                        self.pivot = local.date();
                        info!(pivot = %self.pivot, "Jumping calendar to first available slot");
                    }
                }
                let still_bookable = self.selection.selected().is_some_and(|selected| {
                    slots
                        .iter()
                        .any(|slot| slot.datetime == selected.datetime && slot.is_selectable())
                });
                if self.selection.selected().is_some() && !still_bookable {
                    debug!("Selected slot is no longer bookable");
                    let contact = self.selection.contact.clone();
                    self.selection.clear();
                    self.selection.contact = contact;
                }
                self.slots = slots;
            }
            FetchOutcome::Failed(err) => {
                self.loading = false;
                self.notice = Some(Notice::fetch_failed(err.fetch_message()));
            }
            FetchOutcome::Cancelled => self.loading = false,
        }
    }
}

pub struct BookingView<A, C> {
    state: Arc<watch::Sender<BookingState>>,
    fetcher: SlotFetcher<A>,
    clock: Arc<C>,
    diagnostics_enabled: bool,
    /// Parent of every fetch run. Replaced on mount once cancelled.
    runs: Mutex<CancellationToken>,
}

impl<A, C> BookingView<A, C>
where
    A: BookingApi + Send + Sync + 'static,
    C: Clock,
{
    pub fn new<T: Configuration>(api: Arc<A>, clock: C, configuration: &T) -> Self {
        let pivot = clock.now().date_naive();
        let (sender, _) = watch::channel(BookingState::new(pivot));
        Self {
            state: Arc::new(sender),
            fetcher: SlotFetcher::from_configuration(api, configuration),
            clock: Arc::new(clock),
            diagnostics_enabled: configuration.diagnostics_enabled(),
            runs: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn snapshot(&self) -> BookingState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> WatchStream<BookingState> {
        WatchStream::new(self.state.subscribe())
    }

    pub fn mount(&self) -> JoinHandle<()> {
        debug!("Booking view mounted, fetching slots");
        {
            let mut runs = self.runs();
            if runs.is_cancelled() {
                *runs = CancellationToken::new();
            }
        }
        self.fetch_slots()
    }

    /// Stops pending back-off and safety timers. Responses still in flight
    /// are dropped when they land.
    pub fn unmount(&self) {
        debug!("Booking view unmounted");
        self.runs().cancel();
    }

    fn runs(&self) -> MutexGuard<'_, CancellationToken> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new fetch run. Runs are not de-duplicated; the last one to
    /// succeed decides the slot list.
    pub fn fetch_slots(&self) -> JoinHandle<()> {
        self.state.send_modify(|state| state.loading = true);

        let state = Arc::downgrade(&self.state);
        let fetcher = self.fetcher.clone();
        let clock = self.clock.clone();
        let cancel = self.runs().child_token();

        tokio::spawn(async move {
            let timeout_state = state.clone();
            let outcome = fetcher
                .run(&cancel, move || {
                    update(&timeout_state, |state| {
                        state.loading = false;
                        state.notice = Some(Notice::timeout());
                    })
                })
                .await;

            let zone = clock.zone();
            update(&state, |state| state.apply_fetch(outcome, &zone));
        })
    }

    pub fn retry(&self) -> JoinHandle<()> {
        self.dismiss_notice();
        self.fetch_slots()
    }

    pub fn dismiss_notice(&self) {
        self.state
            .send_if_modified(|state| state.notice.take().is_some());
    }

    pub fn projection(&self) -> CalendarProjection {
        let now = self.clock.now();
        let state = self.state.borrow();
        calendar::project(
            state.view,
            state.pivot,
            &state.slots,
            now.date_naive(),
            &now.timezone(),
        )
    }

    /// Actions to offer when the visible window has no slots; empty otherwise.
    pub fn empty_window_actions(&self) -> Vec<EmptyWindowAction> {
        if self.projection().is_empty() {
            calendar::empty_window_actions(self.diagnostics_enabled)
        } else {
            Vec::new()
        }
    }

    pub fn next_week(&self) {
        self.state
            .send_modify(|state| state.pivot = calendar::next_week(state.pivot));
    }

    pub fn previous_week(&self) {
        self.state
            .send_modify(|state| state.pivot = calendar::previous_week(state.pivot));
    }

    pub fn set_view(&self, view: CalendarView) {
        self.state.send_if_modified(|state| {
            let changed = state.view != view;
            state.view = view;
            changed
        });
    }

    /// Selects `slot` if it can be booked; otherwise the selection stays as it is.
    pub fn select(&self, slot: &Slot) -> bool {
        self.state
            .send_if_modified(|state| state.selection.select(slot))
    }

    /// Selects the `index`-th slot of the current projection.
    pub fn select_index(&self, index: usize) -> bool {
        match self.projection().slots().nth(index).cloned() {
            Some(slot) => self.select(&slot),
            None => false,
        }
    }

    pub fn set_name(&self, name: &str) {
        self.state
            .send_modify(|state| state.selection.contact.name = name.to_string());
    }

    pub fn set_email(&self, email: &str) {
        self.state
            .send_modify(|state| state.selection.contact.email = email.to_string());
    }

    /// Books the selected slot. On success the form is reset and the slot list
    /// refreshed; on failure everything entered is kept for another attempt.
    /// While one submission is pending further calls are refused untouched.
    pub async fn submit(&self, name: &str, email: &str) -> Result<(), BookingError> {
        let mut prepared = Err(BookingError::NoSlotSelected);
        self.state.send_if_modified(|state| {
            if state.submitting {
                prepared = Err(BookingError::SubmissionInProgress);
                return false;
            }
            state.selection.contact.name = name.to_string();
            state.selection.contact.email = email.to_string();
            prepared = state.selection.booking_request();
            match &prepared {
                Ok(_) => state.submitting = true,
                Err(BookingError::NoSlotSelected) => {
                    state.notice = Some(Notice::warning(
                        "No Slot Selected",
                        BookingError::NoSlotSelected.to_string(),
                    ))
                }
                Err(err) => {
                    state.notice = Some(Notice::warning("Check Your Details", err.to_string()))
                }
            }
            true
        });
        if let Err(BookingError::SubmissionInProgress) = &prepared {
            debug!("Booking already in progress, ignoring submit");
        }
        let request = prepared?;

        match selection::submit_booking(self.fetcher.api().as_ref(), request).await {
            Ok(confirmation) => {
                self.state.send_modify(|state| {
                    state.submitting = false;
                    state.selection.clear();
                    state.notice = Some(Notice::success(confirmation));
                });
                self.fetch_slots();
                Ok(())
            }
            Err(err) => {
                self.state.send_modify(|state| {
                    state.submitting = false;
                    state.notice = Some(Notice::error(selection::failure_message(&err)));
                });
                Err(err)
            }
        }
    }

    /// Sends the contact form; the message is prefixed with its subject line.
    pub async fn submit_contact(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), BookingError> {
        let request =
            ContactRequest::with_subject(name.trim().into(), email.trim().into(), subject, body);
        if let Err(errors) = request.validate() {
            let err = BookingError::from(errors);
            self.state.send_modify(|state| {
                state.notice = Some(Notice::warning("Check Your Details", err.to_string()))
            });
            return Err(err);
        }

        match self.fetcher.api().submit_contact(request).await {
            Ok(response) => {
                let message = response.message.unwrap_or_else(|| {
                    "Thank you for contacting us! We will get back to you soon.".to_string()
                });
                self.state
                    .send_modify(|state| state.notice = Some(Notice::success(message)));
                Ok(())
            }
            Err(err) => {
                warn!(?err, "Contact submission failed");
                let message = err
                    .server_message()
                    .unwrap_or(GENERIC_CONTACT_MESSAGE)
                    .to_string();
                self.state
                    .send_modify(|state| state.notice = Some(Notice::error(message)));
                Err(err.into())
            }
        }
    }

    /// Fires the diagnostic requests. Never touches the view state.
    pub async fn run_diagnostics(&self) -> bool {
        if !self.diagnostics_enabled {
            warn!("Diagnostics are disabled in this build");
            return false;
        }
        self.fetcher.api().run_diagnostics().await;
        true
    }
}

impl<A, C> Drop for BookingView<A, C> {
    fn drop(&mut self) {
        self.runs
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}

fn update(state: &Weak<watch::Sender<BookingState>>, modify: impl FnOnce(&mut BookingState)) {
    match state.upgrade() {
        Some(sender) => sender.send_modify(modify),
        None => debug!("Booking view is gone, dropping update"),
    }
}
