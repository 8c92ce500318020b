//! Customer-side wait for a supervisor's answer to an escalated question.

use crate::remote::RequestStore;
use crate::types::HelpRequestId;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_FOLLOWUP_POLL: Duration = Duration::from_secs(2);
pub const DEFAULT_FOLLOWUP_TIMEOUT: Duration = Duration::from_secs(30);
pub const UNAVAILABLE_REPLY: &str =
    "I'm sorry, my supervisor is currently unavailable. Could you please try again later?";

/// Poll `id` until it is resolved and return its answer, or `None` once `timeout`
/// elapses or the request disappears. Fetch errors are logged and polling continues.
pub async fn await_answer<S: RequestStore>(
    store: &S,
    id: &HelpRequestId,
    poll: Duration,
    timeout: Duration,
) -> Option<String> {
    let wait = async {
        let mut ticker = tokio::time::interval(poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.get_request(id).await {
                Ok(Some(request)) if !request.is_pending() => return request.answer,
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::warn!(request_id = %id, "help request no longer exists");
                    return None;
                }
                Err(error) => {
                    tracing::warn!(request_id = %id, %error, "follow-up poll failed");
                }
            }
        }
    };
    match tokio::time::timeout(timeout, wait).await {
        Ok(answer) => answer,
        Err(_) => {
            tracing::info!(request_id = %id, ?timeout, "no supervisor answer in time");
            None
        }
    }
}
