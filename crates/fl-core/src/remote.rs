use crate::error::ClientError;
use crate::types::{ChatReply, HelpRequest, HelpRequestId};
use std::future::Future;

/// The authoritative request collection as seen from an observer.
///
/// Implementations must be safe to share between observers; the core never assumes
/// exclusive access and never locks the store.
pub trait RequestStore: Send + Sync + 'static {
    fn list_requests(&self) -> impl Future<Output = Result<Vec<HelpRequest>, ClientError>> + Send;

    fn get_request(
        &self,
        id: &HelpRequestId,
    ) -> impl Future<Output = Result<Option<HelpRequest>, ClientError>> + Send;

    fn resolve_request(
        &self,
        id: &HelpRequestId,
        answer: &str,
    ) -> impl Future<Output = Result<HelpRequest, ClientError>> + Send;
}

/// The automated agent the customer converses with.
pub trait AgentClient: Send + Sync + 'static {
    fn converse(
        &self,
        message: &str,
        customer_name: &str,
    ) -> impl Future<Output = Result<ChatReply, ClientError>> + Send;
}
