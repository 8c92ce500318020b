use crate::types::enums::RequestStatus;
use crate::types::ids::HelpRequestId;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateHelpRequestInput {
    pub customer_name: String,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HelpRequestCreated {
    pub status: RequestStatus,
    pub request_id: HelpRequestId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResolveRequestInput {
    pub request_id: HelpRequestId,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct RequestFilter {
    pub id: Option<HelpRequestId>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddKnowledgeInput {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatInput {
    pub message: String,
    pub customer_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatReply {
    pub response: String,
    /// Set when the agent escalated the message to a supervisor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<HelpRequestId>,
}
