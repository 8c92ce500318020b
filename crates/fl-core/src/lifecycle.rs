use crate::error::{ClientError, ValidationError};
use crate::types::{HelpRequest, RequestAction, RequestStatus};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

pub fn validate_transition(
    current: RequestStatus,
    action: RequestAction,
) -> Result<RequestStatus, ValidationError> {
    use RequestStatus::{Pending, Resolved};

    match (current, action) {
        (Pending, RequestAction::Resolve) => Ok(Resolved),
        (Resolved, RequestAction::Resolve) => Err(ValidationError::AlreadyResolved),
    }
}

pub fn check_answer(answer: &str) -> Result<(), ValidationError> {
    if answer.trim().is_empty() {
        return Err(ValidationError::EmptyAnswer);
    }
    Ok(())
}

pub fn apply_resolution(request: &HelpRequest, answer: &str) -> Result<HelpRequest, ValidationError> {
    apply_resolution_at(request, answer, Utc::now())
}

/// Resolve `request` with `answer` at `at`. The input record is left untouched.
pub fn apply_resolution_at(
    request: &HelpRequest,
    answer: &str,
    at: DateTime<Utc>,
) -> Result<HelpRequest, ValidationError> {
    check_answer(answer)?;
    let status = validate_transition(request.status, RequestAction::Resolve)?;
    Ok(HelpRequest {
        status,
        resolved_at: Some(at),
        answer: Some(answer.to_string()),
        ..request.clone()
    })
}

/// `resolved_at` and `answer` are present exactly when the request is resolved.
pub fn validate_record(request: &HelpRequest) -> Result<(), ClientError> {
    let consistent = match request.status {
        RequestStatus::Pending => request.resolved_at.is_none() && request.answer.is_none(),
        RequestStatus::Resolved => request.resolved_at.is_some() && request.answer.is_some(),
    };
    if consistent {
        Ok(())
    } else {
        Err(ClientError::InconsistentSnapshot {
            message: format!("request {} violates the resolution invariant", request.id),
        })
    }
}

pub fn validate_snapshot(requests: &[HelpRequest]) -> Result<(), ClientError> {
    let mut seen = HashSet::with_capacity(requests.len());
    for request in requests {
        validate_record(request)?;
        if !seen.insert(&request.id) {
            return Err(ClientError::InconsistentSnapshot {
                message: format!("duplicate request id {}", request.id),
            });
        }
    }
    Ok(())
}
