use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::error::SunoError;
use super::status::{TaskStatus, MISSING_STATUS};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl PollSettings {
    /// A zero interval never advances elapsed time, so it is only allowed
    /// alongside a zero `max_wait`.
    pub fn validate(&self) -> Result<(), SunoError> {
        if self.poll_interval.is_zero() && !self.max_wait.is_zero() {
            return Err(SunoError::ZeroPollInterval {
                max_wait: self.max_wait,
            });
        }
        Ok(())
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Lets a caller stop a wait loop. Checked between polls, never mid-request.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Polls until the task succeeds, fails, is cancelled, or `max_wait` elapses.
///
/// `fetch` returns the record-info envelope; the `data` object of the first
/// `SUCCESS` response is returned. Elapsed time advances by exactly one
/// `poll_interval` per sleep.
pub fn poll_until_complete<F>(
    task_id: &str,
    settings: &PollSettings,
    sleeper: &dyn Sleeper,
    cancel: &CancellationToken,
    mut fetch: F,
) -> Result<Value, SunoError>
where
    F: FnMut(&str) -> Result<Value, SunoError>,
{
    settings.validate()?;
    let mut elapsed = Duration::ZERO;
    let mut last_status = "PENDING".to_string();
    info!(task_id, "waiting for suno task to complete");

    while elapsed < settings.max_wait {
        if cancel.is_cancelled() {
            warn!(task_id, status = %last_status, "suno polling cancelled");
            return Err(SunoError::Cancelled {
                task_id: task_id.to_string(),
                last_status,
            });
        }

        let envelope = fetch(task_id)?;
        let data = match envelope.get("data") {
            Some(Value::Object(data)) => data.clone(),
            _ => Map::new(),
        };
        let raw_status = data
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or(MISSING_STATUS);
        let status = TaskStatus::parse(raw_status);
        info!(
            task_id,
            status = %status,
            elapsed_s = elapsed.as_secs_f64(),
            "suno task status"
        );

        match status {
            TaskStatus::Success => return Ok(Value::Object(data)),
            TaskStatus::Failed(kind) => {
                let message = data
                    .get("errorMessage")
                    .and_then(Value::as_str)
                    .filter(|message| !message.is_empty())
                    .unwrap_or(kind.as_str())
                    .to_string();
                return Err(SunoError::RemoteFailure {
                    task_id: task_id.to_string(),
                    status: kind,
                    message,
                });
            }
            TaskStatus::Unknown(ref raw) => {
                debug!(task_id, status = %raw, "unrecognised suno status; still waiting");
            }
            TaskStatus::Pending(_) => {}
        }

        last_status = status.as_str().to_string();
        sleeper.sleep(settings.poll_interval);
        elapsed += settings.poll_interval;
    }

    Err(SunoError::Timeout {
        task_id: task_id.to_string(),
        last_status,
        waited: settings.max_wait,
    })
}
