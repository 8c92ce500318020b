use crate::error::{ClientError, ValidationError};
use crate::lifecycle::apply_resolution;
use crate::remote::{AgentClient, RequestStore};
use crate::types::{ChatReply, HelpRequest, HelpRequestId};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub(crate) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0).unwrap()
}

pub(crate) fn pending(id: &str, created_at: DateTime<Utc>) -> HelpRequest {
    HelpRequest::pending(
        HelpRequestId::new(id.to_string()).expect("valid id"),
        "Customer".to_string(),
        format!("question for {id}"),
        created_at,
    )
}

pub(crate) fn id(value: &str) -> HelpRequestId {
    HelpRequestId::new(value.to_string()).expect("valid id")
}

/// In-memory remote store with knobs for failures, latency and gating.
#[derive(Default)]
pub(crate) struct FakeStore {
    requests: Mutex<Vec<HelpRequest>>,
    list_failure: Mutex<Option<ClientError>>,
    resolve_failure: Mutex<Option<ClientError>>,
    list_delay: Mutex<Option<Duration>>,
    list_gate: Mutex<Option<Arc<Notify>>>,
    pub list_started: Notify,
    pub list_calls: AtomicUsize,
    pub resolve_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeStore {
    pub(crate) fn with_requests(requests: Vec<HelpRequest>) -> Arc<Self> {
        let store = Self::default();
        *store.requests.lock().unwrap() = requests;
        Arc::new(store)
    }

    pub(crate) fn set_requests(&self, requests: Vec<HelpRequest>) {
        *self.requests.lock().unwrap() = requests;
    }

    pub(crate) fn requests(&self) -> Vec<HelpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn fail_lists_with(&self, error: Option<ClientError>) {
        *self.list_failure.lock().unwrap() = error;
    }

    pub(crate) fn fail_resolves_with(&self, error: Option<ClientError>) {
        *self.resolve_failure.lock().unwrap() = error;
    }

    pub(crate) fn delay_lists(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn gate_lists(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

impl RequestStore for FakeStore {
    async fn list_requests(&self) -> Result<Vec<HelpRequest>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);
        self.list_started.notify_one();

        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let gate = self.list_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let failure = self.list_failure.lock().unwrap().clone();
        match failure {
            Some(error) => Err(error),
            None => Ok(self.requests()),
        }
    }

    async fn get_request(&self, id: &HelpRequestId) -> Result<Option<HelpRequest>, ClientError> {
        let failure = self.list_failure.lock().unwrap().clone();
        if let Some(error) = failure {
            return Err(error);
        }
        Ok(self.requests().into_iter().find(|request| &request.id == id))
    }

    async fn resolve_request(
        &self,
        id: &HelpRequestId,
        answer: &str,
    ) -> Result<HelpRequest, ClientError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let failure = self.resolve_failure.lock().unwrap().clone();
        if let Some(error) = failure {
            return Err(error);
        }
        let mut requests = self.requests.lock().unwrap();
        let Some(slot) = requests.iter_mut().find(|request| &request.id == id) else {
            return Err(ClientError::RemoteRejection {
                code: "not_found".to_string(),
                message: "help request not found".to_string(),
            });
        };
        let resolved = apply_resolution(slot, answer).map_err(|err| match err {
            ValidationError::AlreadyResolved => ClientError::RemoteRejection {
                code: "conflict".to_string(),
                message: err.to_string(),
            },
            other => ClientError::Validation(other),
        })?;
        *slot = resolved.clone();
        Ok(resolved)
    }
}

#[derive(Default)]
pub(crate) struct FakeAgent {
    failure: Mutex<Option<ClientError>>,
    escalate: Mutex<Option<HelpRequestId>>,
    pub calls: AtomicUsize,
}

impl FakeAgent {
    pub(crate) fn fail_with(&self, error: Option<ClientError>) {
        *self.failure.lock().unwrap() = error;
    }

    pub(crate) fn escalate_to(&self, id: HelpRequestId) {
        *self.escalate.lock().unwrap() = Some(id);
    }
}

impl AgentClient for FakeAgent {
    async fn converse(&self, message: &str, _customer_name: &str) -> Result<ChatReply, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let failure = self.failure.lock().unwrap().clone();
        if let Some(error) = failure {
            return Err(error);
        }
        let escalated = self.escalate.lock().unwrap().clone();
        Ok(match escalated {
            Some(id) => ChatReply {
                response: "Let me check with my supervisor and get back to you.".to_string(),
                request_id: Some(id),
            },
            None => ChatReply {
                response: format!("echo: {message}"),
                request_id: None,
            },
        })
    }
}
