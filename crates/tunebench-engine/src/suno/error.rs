use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tunebench_contracts::models::LimitedField;

use super::status::FailureKind;
use super::transport::TransportError;

/// Pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Submit,
    Poll,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Submit => "submit",
            Self::Poll => "poll",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid model '{model}'; choose from: {}", .known.join(", "))]
    UnknownModel { model: String, known: Vec<String> },
    #[error("'{field}' is required when {context}")]
    MissingField {
        field: LimitedField,
        context: &'static str,
    },
    #[error("'{field}' too long for {context} ({len} chars, max {limit})")]
    TooLong {
        field: LimitedField,
        context: String,
        len: usize,
        limit: usize,
    },
}

#[derive(Debug, Error)]
pub enum SunoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("SUNO_API_KEY not set")]
    MissingCredential { stage: Stage },
    #[error("{stage}: {error}")]
    Transport { stage: Stage, error: TransportError },
    #[error("{stage}: Suno API error {code}: {message}")]
    Business {
        stage: Stage,
        code: i64,
        message: String,
    },
    #[error("{stage}: malformed response: {detail}")]
    MalformedResponse { stage: Stage, detail: String },
    #[error("generation failed for task {task_id} ({status}): {message}")]
    RemoteFailure {
        task_id: String,
        status: FailureKind,
        message: String,
    },
    #[error("timed out after {waited:?}; task {task_id} is still in status {last_status}")]
    Timeout {
        task_id: String,
        last_status: String,
        waited: Duration,
    },
    #[error("polling cancelled for task {task_id} (last status {last_status})")]
    Cancelled { task_id: String, last_status: String },
    #[error("poll interval must be greater than zero when max wait is {max_wait:?}")]
    ZeroPollInterval { max_wait: Duration },
}

impl SunoError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation(_) => Stage::Validate,
            Self::MissingCredential { stage }
            | Self::Transport { stage, .. }
            | Self::Business { stage, .. }
            | Self::MalformedResponse { stage, .. } => *stage,
            Self::RemoteFailure { .. }
            | Self::Timeout { .. }
            | Self::Cancelled { .. }
            | Self::ZeroPollInterval { .. } => Stage::Poll,
        }
    }

    /// Whether resubmitting the same input could succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::RemoteFailure { .. })
    }
}
