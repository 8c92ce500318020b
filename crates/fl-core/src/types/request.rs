use crate::types::enums::RequestStatus;
use crate::types::ids::HelpRequestId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HelpRequest {
    pub id: HelpRequestId,
    pub customer_name: String,
    pub question: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl HelpRequest {
    pub fn pending(
        id: HelpRequestId,
        customer_name: String,
        question: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_name,
            question,
            status: RequestStatus::Pending,
            created_at,
            resolved_at: None,
            answer: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
    pub updated_at: DateTime<Utc>,
}
