use std::fmt;

/// Intermediate states the service reports before the audio is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingStage {
    Pending,
    TextSuccess,
    FirstSuccess,
}

/// Statuses after which the task will never succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    CreateTaskFailed,
    GenerateAudioFailed,
    CallbackException,
    SensitiveWordError,
}

const FAILURE_KINDS: [(FailureKind, &str); 4] = [
    (FailureKind::CreateTaskFailed, "CREATE_TASK_FAILED"),
    (FailureKind::GenerateAudioFailed, "GENERATE_AUDIO_FAILED"),
    (FailureKind::CallbackException, "CALLBACK_EXCEPTION"),
    (FailureKind::SensitiveWordError, "SENSITIVE_WORD_ERROR"),
];

const PENDING_STAGES: [(PendingStage, &str); 3] = [
    (PendingStage::Pending, "PENDING"),
    (PendingStage::TextSuccess, "TEXT_SUCCESS"),
    (PendingStage::FirstSuccess, "FIRST_SUCCESS"),
];

const SUCCESS: &str = "SUCCESS";

/// Reported when the record-info payload carries no status at all.
pub const MISSING_STATUS: &str = "UNKNOWN";

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        FAILURE_KINDS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, wire)| *wire)
            .unwrap_or("FAILED")
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PendingStage {
    pub fn as_str(self) -> &'static str {
        PENDING_STAGES
            .iter()
            .find(|(stage, _)| *stage == self)
            .map(|(_, wire)| *wire)
            .unwrap_or("PENDING")
    }
}

/// Remote task status. Strings the client does not recognise are kept as
/// `Unknown` and treated as still in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending(PendingStage),
    Success,
    Failed(FailureKind),
    Unknown(String),
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Self {
        if raw == SUCCESS {
            return Self::Success;
        }
        if let Some((kind, _)) = FAILURE_KINDS.iter().find(|(_, wire)| *wire == raw) {
            return Self::Failed(*kind);
        }
        if let Some((stage, _)) = PENDING_STAGES.iter().find(|(_, wire)| *wire == raw) {
            return Self::Pending(*stage);
        }
        Self::Unknown(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending(stage) => stage.as_str(),
            Self::Success => SUCCESS,
            Self::Failed(kind) => kind.as_str(),
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed(_))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
