use crate::error::ClientError;
use crate::lifecycle::{check_answer, validate_transition};
use crate::notifications::NotificationCenter;
use crate::remote::RequestStore;
use crate::sync::{RefreshTrigger, Snapshot};
use crate::types::{HelpRequest, RequestAction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const SUBMIT_SUCCESS_MESSAGE: &str = "Response sent successfully!";

/// Supervisor-side submission state: the selected request, the answer draft and
/// whether a submission is in flight.
pub struct SupervisorDesk<S> {
    store: Arc<S>,
    notifications: NotificationCenter,
    refresh: Option<RefreshTrigger>,
    state: Mutex<DeskState>,
    in_flight: AtomicBool,
}

#[derive(Debug, Default)]
struct DeskState {
    selected: Option<HelpRequest>,
    draft: String,
}

/// Holds an in-flight flag for as long as it lives.
pub(crate) struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: RequestStore> SupervisorDesk<S> {
    pub fn new(store: Arc<S>, notifications: NotificationCenter) -> Self {
        Self {
            store,
            notifications,
            refresh: None,
            state: Mutex::new(DeskState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Re-synchronize this observer after every successful submission.
    #[must_use]
    pub fn with_refresh(mut self, refresh: RefreshTrigger) -> Self {
        self.refresh = Some(refresh);
        self
    }

    fn lock(&self) -> MutexGuard<'_, DeskState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn select(&self, request: HelpRequest) {
        let mut state = self.lock();
        let changed = state.selected.as_ref().map(|s| &s.id) != Some(&request.id);
        if changed {
            state.draft.clear();
        }
        state.selected = Some(request);
    }

    pub fn clear_selection(&self) {
        let mut state = self.lock();
        state.selected = None;
        state.draft.clear();
    }

    pub fn selected(&self) -> Option<HelpRequest> {
        self.lock().selected.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.lock().draft = text.into();
    }

    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn can_submit(&self) -> bool {
        if self.is_submitting() {
            return false;
        }
        let state = self.lock();
        match &state.selected {
            Some(request) => request.is_pending() && check_answer(&state.draft).is_ok(),
            None => false,
        }
    }

    /// Replace the selected record with its newer version from `snapshot`, if present.
    pub fn reconcile(&self, snapshot: &Snapshot) {
        let mut state = self.lock();
        let Some(selected) = state.selected.as_ref() else {
            return;
        };
        if let Some(fresh) = snapshot.get(&selected.id) {
            state.selected = Some(fresh.clone());
        }
    }

    /// Submit the draft as the answer to the selected request.
    ///
    /// Validation failures return without touching the network or posting a
    /// notification. On success the selection is cleared and the observer re-synced;
    /// on failure the selection and draft are kept for a retry.
    pub async fn submit(&self) -> Result<HelpRequest, ClientError> {
        let Some(_guard) = SubmitGuard::acquire(&self.in_flight) else {
            return Err(ClientError::SubmissionInFlight);
        };
        let (request, answer) = {
            let state = self.lock();
            let Some(request) = state.selected.clone() else {
                return Err(ClientError::NothingSelected);
            };
            (request, state.draft.clone())
        };
        check_answer(&answer)?;
        validate_transition(request.status, RequestAction::Resolve)?;

        match self.store.resolve_request(&request.id, &answer).await {
            Ok(resolved) => {
                {
                    let mut state = self.lock();
                    if state.selected.as_ref().map(|s| &s.id) == Some(&request.id) {
                        state.selected = None;
                        state.draft.clear();
                    }
                }
                tracing::info!(request_id = %request.id, "help request resolved");
                self.notifications.success(SUBMIT_SUCCESS_MESSAGE);
                if let Some(refresh) = &self.refresh {
                    refresh.request();
                }
                Ok(resolved)
            }
            Err(error) => {
                tracing::warn!(request_id = %request.id, %error, "resolution failed");
                if error.is_reportable() {
                    self.notifications.error(format!("Error: {error}"));
                }
                Err(error)
            }
        }
    }
}
