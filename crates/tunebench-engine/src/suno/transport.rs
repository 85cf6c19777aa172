use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

const ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("request to {url} failed ({status}): {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("{url} returned invalid JSON payload: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// JSON-over-HTTP seam between the Suno client and the network.
pub trait SunoTransport {
    fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<Value, TransportError>;

    fn get_json(
        &self,
        url: &str,
        api_key: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, TransportError>;
}

/// Blocking reqwest transport with a per-request timeout.
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Request {
                url: String::new(),
                message: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self { http })
    }
}

impl SunoTransport for HttpTransport {
    fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .map_err(|err| request_error(url, &err))?;
        response_json_or_error(url, response)
    }

    fn get_json(
        &self,
        url: &str,
        api_key: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(api_key)
            .query(query)
            .send()
            .map_err(|err| request_error(url, &err))?;
        response_json_or_error(url, response)
    }
}

fn request_error(url: &str, err: &reqwest::Error) -> TransportError {
    TransportError::Request {
        url: url.to_string(),
        message: err.to_string(),
    }
}

fn response_json_or_error(url: &str, response: HttpResponse) -> Result<Value, TransportError> {
    let status = response.status();
    let body = response.text().map_err(|err| request_error(url, &err))?;
    map_response(url, status, &body)
}

/// Non-2xx becomes `Status` with a truncated body; anything else must be JSON.
fn map_response(url: &str, status: StatusCode, body: &str) -> Result<Value, TransportError> {
    if !status.is_success() {
        return Err(TransportError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body: truncate_text(body, ERROR_BODY_CHARS),
        });
    }
    serde_json::from_str(body).map_err(|err| TransportError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    })
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const URL: &str = "https://api.example/generate";

    #[test]
    fn truncate_text_appends_ellipsis_past_limit() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc…");
    }

    #[test]
    fn status_errors_expose_http_code() {
        let err = TransportError::Status {
            url: URL.to_string(),
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(
            err.to_string(),
            "request to https://api.example/generate failed (503): unavailable"
        );
    }

    #[test]
    fn error_status_keeps_code_and_truncates_body() {
        let body = "x".repeat(600);
        let err = map_response(URL, StatusCode::SERVICE_UNAVAILABLE, &body).unwrap_err();
        match err {
            TransportError::Status { url, status, body } => {
                assert_eq!(url, URL);
                assert_eq!(status, 503);
                assert_eq!(body.chars().count(), ERROR_BODY_CHARS + 1);
                assert!(body.ends_with('…'));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn error_status_wins_over_json_body() {
        let err = map_response(URL, StatusCode::UNAUTHORIZED, r#"{"code":401}"#).unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().ends_with(r#"(401): {"code":401}"#));
    }

    #[test]
    fn success_with_invalid_json_is_a_decode_error() {
        let err = map_response(URL, StatusCode::OK, "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, TransportError::Decode { ref url, .. } if url == URL));
        assert_eq!(err.status(), None);
        assert!(err
            .to_string()
            .starts_with("https://api.example/generate returned invalid JSON"));
    }

    #[test]
    fn success_with_json_body_is_parsed() {
        let value = map_response(
            URL,
            StatusCode::OK,
            r#"{"code":200,"msg":"success","data":{"taskId":"task-1"}}"#,
        )
        .unwrap();
        assert_eq!(value["data"]["taskId"], json!("task-1"));
    }
}
