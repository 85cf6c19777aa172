pub mod error;
pub mod extract;
pub mod payload;
pub mod poller;
pub mod request;
pub mod status;
pub mod transport;
pub mod validate;

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use tunebench_contracts::results::GeneratedTrack;

use crate::config::SunoConfig;

use self::error::{Stage, SunoError};
use self::extract::extract_tracks;
use self::payload::build_payload;
use self::poller::{poll_until_complete, CancellationToken, Sleeper, ThreadSleeper};
use self::request::GenerationRequest;
use self::transport::{HttpTransport, SunoTransport};
use self::validate::validate_request;

const SUCCESS_CODE: i64 = 200;

/// Accepted submission: the task id plus the raw response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedTask {
    pub task_id: String,
    pub envelope: Value,
}

/// A finished generation with its normalised tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct SunoGeneration {
    pub task_id: String,
    pub tracks: Vec<GeneratedTrack>,
    pub data: Value,
}

pub struct SunoClient<T: SunoTransport = HttpTransport> {
    config: SunoConfig,
    transport: T,
    sleeper: Arc<dyn Sleeper>,
}

impl SunoClient<HttpTransport> {
    pub fn new(config: SunoConfig) -> Result<Self, SunoError> {
        let transport =
            HttpTransport::new(config.request_timeout).map_err(|error| SunoError::Transport {
                stage: Stage::Submit,
                error,
            })?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: SunoTransport> SunoClient<T> {
    pub fn with_transport(config: SunoConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &SunoConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Validates and submits one request. Never retried.
    pub fn submit(&self, request: &GenerationRequest) -> Result<SubmittedTask, SunoError> {
        let api_key = self.api_key(Stage::Submit)?;
        validate_request(request, &self.config.models)?;
        let payload = Value::Object(build_payload(request, &self.config.callback_url));

        info!(
            model = %request.model,
            custom_mode = request.custom_mode,
            instrumental = request.instrumental,
            prompt_chars = request.prompt_chars(),
            "submitting suno generation"
        );
        let envelope = self
            .transport
            .post_json(&self.config.generate_url(), api_key, &payload)
            .map_err(|error| SunoError::Transport {
                stage: Stage::Submit,
                error,
            })?;
        check_envelope(&envelope, Stage::Submit)?;

        let task_id = envelope
            .get("data")
            .and_then(|data| data.get("taskId"))
            .and_then(Value::as_str)
            .filter(|task_id| !task_id.is_empty())
            .ok_or_else(|| SunoError::MalformedResponse {
                stage: Stage::Submit,
                detail: "no data.taskId in response".to_string(),
            })?
            .to_string();
        info!(task_id = %task_id, "suno task submitted");

        Ok(SubmittedTask { task_id, envelope })
    }

    /// One record-info lookup; returns the raw envelope.
    pub fn task_status(&self, task_id: &str) -> Result<Value, SunoError> {
        let api_key = self.api_key(Stage::Poll)?;
        let envelope = self
            .transport
            .get_json(
                &self.config.record_info_url(),
                api_key,
                &[("taskId", task_id)],
            )
            .map_err(|error| SunoError::Transport {
                stage: Stage::Poll,
                error,
            })?;
        check_envelope(&envelope, Stage::Poll)?;
        Ok(envelope)
    }

    /// Polls until the task reaches a terminal status and returns its `data`.
    pub fn wait_for_completion(
        &self,
        task_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, SunoError> {
        self.api_key(Stage::Poll)?;
        poll_until_complete(
            task_id,
            &self.config.poll,
            self.sleeper.as_ref(),
            cancel,
            |task_id| self.task_status(task_id),
        )
    }

    /// Submit, wait and extract in one call.
    pub fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<SunoGeneration, SunoError> {
        let submitted = self.submit(request)?;
        let data = self.wait_for_completion(&submitted.task_id, cancel)?;
        let tracks = extract_tracks(&data);
        if tracks.is_empty() {
            warn!(task_id = %submitted.task_id, "suno task succeeded without tracks");
        }
        info!(task_id = %submitted.task_id, tracks = tracks.len(), "suno generation complete");
        Ok(SunoGeneration {
            task_id: submitted.task_id,
            tracks,
            data,
        })
    }

    fn api_key(&self, stage: Stage) -> Result<&str, SunoError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(SunoError::MissingCredential { stage })
    }
}

/// A present `code` other than 200 is a business error carrying `msg`.
fn check_envelope(envelope: &Value, stage: Stage) -> Result<(), SunoError> {
    let Some(code) = envelope.get("code") else {
        return Ok(());
    };
    let code = code.as_i64().ok_or_else(|| SunoError::MalformedResponse {
        stage,
        detail: format!("non-integer code {code}"),
    })?;
    if code == SUCCESS_CODE {
        return Ok(());
    }
    let message = envelope
        .get("msg")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or("Unknown error")
        .to_string();
    Err(SunoError::Business {
        stage,
        code,
        message,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::poller::testing::CountingSleeper;
    use super::poller::PollSettings;
    use super::transport::testing::ScriptedTransport;
    use super::transport::TransportError;
    use super::*;

    fn test_config() -> SunoConfig {
        SunoConfig {
            api_base: "https://api.test/v1".to_string(),
            ..SunoConfig::default()
        }
        .with_api_key("sk-test")
        .with_poll(PollSettings {
            poll_interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(10),
        })
    }

    fn client_with(responses: Vec<Result<Value, TransportError>>) -> SunoClient<ScriptedTransport> {
        SunoClient::with_transport(test_config(), ScriptedTransport::new(responses))
            .with_sleeper(Arc::new(CountingSleeper::default()))
    }

    fn accepted(task_id: &str) -> Value {
        json!({"code": 200, "msg": "success", "data": {"taskId": task_id}})
    }

    fn status_envelope(status: &str) -> Value {
        json!({"code": 200, "msg": "success", "data": {"taskId": "task-1", "status": status}})
    }

    #[test]
    fn missing_credential_makes_no_calls() {
        let client = SunoClient::with_transport(SunoConfig::default(), ScriptedTransport::default());
        let err = client
            .submit(&GenerationRequest::new("upbeat pop"))
            .unwrap_err();
        assert!(matches!(
            err,
            SunoError::MissingCredential {
                stage: Stage::Submit
            }
        ));
        assert_eq!(err.to_string(), "SUNO_API_KEY not set");
        assert!(client.task_status("task-1").is_err());
        assert_eq!(client.transport().call_count(), 0);
    }

    #[test]
    fn invalid_request_is_rejected_before_sending() {
        let client = client_with(vec![]);
        let err = client
            .submit(&GenerationRequest::new("x".repeat(501)))
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Validate);
        assert_eq!(client.transport().call_count(), 0);
    }

    #[test]
    fn submit_posts_payload_with_bearer_key() {
        let client = client_with(vec![Ok(accepted("task-42"))]);
        let task = client
            .submit(&GenerationRequest::new("A short relaxing piano tune"))
            .unwrap();
        assert_eq!(task.task_id, "task-42");

        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].url, "https://api.test/v1/generate");
        assert_eq!(calls[0].api_key, "sk-test");
        let body = calls[0].body.clone().unwrap_or_default();
        assert_eq!(body["prompt"], json!("A short relaxing piano tune"));
        assert_eq!(body["callBackUrl"], json!("https://example.com/callback"));
    }

    #[test]
    fn business_error_surfaces_remote_message() {
        let client = client_with(vec![Ok(json!({
            "code": 429,
            "msg": "Insufficient credits",
            "data": null
        }))]);
        let err = client.submit(&GenerationRequest::new("pop")).unwrap_err();
        match err {
            SunoError::Business {
                stage,
                code,
                message,
            } => {
                assert_eq!(stage, Stage::Submit);
                assert_eq!(code, 429);
                assert_eq!(message, "Insufficient credits");
            }
            other => panic!("expected business error, got {other:?}"),
        }
    }

    #[test]
    fn http_failure_is_a_transport_error() {
        let client = client_with(vec![Err(TransportError::Status {
            url: "https://api.test/v1/generate".to_string(),
            status: 401,
            body: "unauthorized".to_string(),
        })]);
        let err = client.submit(&GenerationRequest::new("pop")).unwrap_err();
        assert!(matches!(
            err,
            SunoError::Transport { stage: Stage::Submit, ref error } if error.status() == Some(401)
        ));
    }

    #[test]
    fn missing_task_id_is_malformed() {
        let client = client_with(vec![Ok(json!({"code": 200, "msg": "success", "data": {}}))]);
        let err = client.submit(&GenerationRequest::new("pop")).unwrap_err();
        assert!(matches!(
            err,
            SunoError::MalformedResponse {
                stage: Stage::Submit,
                ..
            }
        ));
    }

    #[test]
    fn task_status_queries_record_info() {
        let client = client_with(vec![Ok(status_envelope("PENDING"))]);
        let envelope = client.task_status("task-7").unwrap();
        assert_eq!(envelope["data"]["status"], json!("PENDING"));
        let calls = client.transport().calls();
        assert_eq!(calls[0].method, "GET");
        assert_eq!(calls[0].url, "https://api.test/v1/generate/record-info");
        assert_eq!(
            calls[0].query,
            vec![("taskId".to_string(), "task-7".to_string())]
        );
    }

    #[test]
    fn poll_business_error_stops_waiting() {
        let client = client_with(vec![Ok(json!({"code": 404, "msg": "task not found"}))]);
        let err = client
            .wait_for_completion("task-x", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            SunoError::Business {
                stage: Stage::Poll,
                code: 404,
                ..
            }
        ));
    }

    #[test]
    fn generate_submits_polls_and_extracts() {
        let sleeper = Arc::new(CountingSleeper::default());
        let client = client_with(vec![
            Ok(accepted("task-1")),
            Ok(status_envelope("PENDING")),
            Ok(status_envelope("TEXT_SUCCESS")),
            Ok(json!({
                "code": 200,
                "msg": "success",
                "data": {
                    "taskId": "task-1",
                    "status": "SUCCESS",
                    "response": {"sunoData": [
                        {"title": "Glitter Hearts", "duration": 190.2, "audioUrl": "https://cdn/a.mp3"},
                        {"title": "Glitter Hearts (Alt)"}
                    ]}
                }
            })),
        ])
        .with_sleeper(sleeper.clone());

        let generation = client
            .generate(
                &GenerationRequest::new("bubblegum pop"),
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(generation.task_id, "task-1");
        assert_eq!(generation.tracks.len(), 2);
        assert_eq!(generation.tracks[0].duration_s, Some(190.2));
        assert_eq!(generation.tracks[1].audio_url, None);
        assert_eq!(sleeper.count(), 2);
        assert_eq!(client.transport().call_count(), 4);
    }

    #[test]
    fn generate_reports_timeout_with_last_status() {
        let sleeper = Arc::new(CountingSleeper::default());
        let config = test_config().with_poll(PollSettings {
            poll_interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(2),
        });
        let client = SunoClient::with_transport(
            config,
            ScriptedTransport::new(vec![
                Ok(accepted("task-1")),
                Ok(status_envelope("PENDING")),
                Ok(status_envelope("FIRST_SUCCESS")),
            ]),
        )
        .with_sleeper(sleeper.clone());
        let err = client
            .generate(&GenerationRequest::new("pop"), &CancellationToken::new())
            .unwrap_err();
        assert_eq!(sleeper.count(), 2);
        assert!(matches!(
            err,
            SunoError::Timeout { ref last_status, .. } if last_status == "FIRST_SUCCESS"
        ));
    }
}
