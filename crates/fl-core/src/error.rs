use thiserror::Error;

/// Rejections raised locally, before anything reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("answer must not be empty")]
    EmptyAnswer,
    #[error("help request already resolved")]
    AlreadyResolved,
    #[error("message must not be empty")]
    EmptyMessage,
}

#[derive(Debug, Error)]
pub enum HelpError {
    #[error("help request not found")]
    HelpNotFound,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Errors of the store-side facade.
#[derive(Debug, Error)]
pub enum FrontloopError {
    #[error(transparent)]
    Help(#[from] HelpError),
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<ValidationError> for FrontloopError {
    fn from(value: ValidationError) -> Self {
        FrontloopError::Help(HelpError::Validation(value))
    }
}

/// Errors seen by an observer talking to the remote store.
///
/// `Transport` and `RemoteRejection` display their cause verbatim so they can be
/// surfaced to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{message}")]
    Transport { message: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    RemoteRejection { code: String, message: String },
    #[error("inconsistent snapshot: {message}")]
    InconsistentSnapshot { message: String },
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("no request selected")]
    NothingSelected,
}

impl ClientError {
    /// Whether the failure should be reported to the user as a notification.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::RemoteRejection { .. } | Self::InconsistentSnapshot { .. }
        )
    }
}
