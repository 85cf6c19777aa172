use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use tunebench_contracts::models::ModelRegistry;

use crate::suno::poller::PollSettings;

pub const DEFAULT_API_BASE: &str = "https://api.sunoapi.org/api/v1";
/// Required by the API even though this client only polls.
pub const DEFAULT_CALLBACK_URL: &str = "https://example.com/callback";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-wide Suno settings, read once at startup and passed explicitly.
#[derive(Clone)]
pub struct SunoConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub callback_url: String,
    pub poll: PollSettings,
    pub request_timeout: Duration,
    pub models: ModelRegistry,
}

impl SunoConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let seconds = |key: &str, default: Duration| -> Result<Duration> {
            match get(key) {
                Some(raw) => parse_seconds(&raw).with_context(|| format!("invalid {key}")),
                None => Ok(default),
            }
        };
        let defaults = PollSettings::default();
        let poll = PollSettings {
            poll_interval: seconds("SUNO_POLL_INTERVAL", defaults.poll_interval)?,
            max_wait: seconds("SUNO_MAX_WAIT", defaults.max_wait)?,
        };
        poll.validate().context("invalid SUNO_POLL_INTERVAL")?;

        Ok(Self {
            api_key: get("SUNO_API_KEY"),
            api_base: get("SUNO_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            callback_url: get("SUNO_CALLBACK_URL")
                .unwrap_or_else(|| DEFAULT_CALLBACK_URL.to_string()),
            poll,
            request_timeout: seconds("SUNO_REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT)?,
            models: ModelRegistry::default(),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn generate_url(&self) -> String {
        format!("{}/generate", self.api_base)
    }

    pub fn record_info_url(&self) -> String {
        format!("{}/generate/record-info", self.api_base)
    }
}

impl Default for SunoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
            poll: PollSettings::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            models: ModelRegistry::default(),
        }
    }
}

impl fmt::Debug for SunoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SunoConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("callback_url", &self.callback_url)
            .field("poll", &self.poll)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn parse_seconds(raw: &str) -> Result<Duration> {
    let value: f64 = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("'{raw}' must be a non-negative, finite number of seconds"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() -> Result<()> {
        let config = SunoConfig::from_lookup(lookup(&[]))?;
        assert_eq!(config.api_key, None);
        assert_eq!(
            config.generate_url(),
            "https://api.sunoapi.org/api/v1/generate"
        );
        assert_eq!(
            config.record_info_url(),
            "https://api.sunoapi.org/api/v1/generate/record-info"
        );
        assert_eq!(config.poll, PollSettings::default());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.callback_url, DEFAULT_CALLBACK_URL);
        Ok(())
    }

    #[test]
    fn overrides_are_trimmed_and_parsed() -> Result<()> {
        let config = SunoConfig::from_lookup(lookup(&[
            ("SUNO_API_KEY", "  sk-test  "),
            ("SUNO_API_BASE", "http://localhost:8080/api/v1/"),
            ("SUNO_POLL_INTERVAL", "2.5"),
            ("SUNO_MAX_WAIT", "60"),
        ]))?;
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.generate_url(), "http://localhost:8080/api/v1/generate");
        assert_eq!(config.poll.poll_interval, Duration::from_millis(2500));
        assert_eq!(config.poll.max_wait, Duration::from_secs(60));
        Ok(())
    }

    #[test]
    fn blank_credential_counts_as_missing() -> Result<()> {
        let config = SunoConfig::from_lookup(lookup(&[("SUNO_API_KEY", "   ")]))?;
        assert_eq!(config.api_key, None);
        Ok(())
    }

    #[test]
    fn invalid_durations_are_rejected() {
        let err = SunoConfig::from_lookup(lookup(&[("SUNO_MAX_WAIT", "soon")]))
            .err()
            .map(|err| format!("{err:#}"))
            .unwrap_or_default();
        assert!(err.contains("invalid SUNO_MAX_WAIT"));
        assert!(SunoConfig::from_lookup(lookup(&[("SUNO_POLL_INTERVAL", "-1")])).is_err());
        assert!(SunoConfig::from_lookup(lookup(&[("SUNO_POLL_INTERVAL", "inf")])).is_err());
    }

    #[test]
    fn oversized_durations_are_errors() {
        for key in ["SUNO_POLL_INTERVAL", "SUNO_MAX_WAIT", "SUNO_REQUEST_TIMEOUT"] {
            let err = SunoConfig::from_lookup(lookup(&[(key, "1e30")]))
                .err()
                .map(|err| format!("{err:#}"))
                .unwrap_or_default();
            assert!(err.contains(&format!("invalid {key}")), "{key}: {err}");
        }
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = SunoConfig::from_lookup(lookup(&[("SUNO_POLL_INTERVAL", "0")]))
            .err()
            .map(|err| format!("{err:#}"))
            .unwrap_or_default();
        assert!(err.contains("invalid SUNO_POLL_INTERVAL"), "{err}");
        assert!(err.contains("greater than zero"), "{err}");
    }

    #[test]
    fn zero_poll_interval_is_allowed_with_zero_max_wait() -> Result<()> {
        let config = SunoConfig::from_lookup(lookup(&[
            ("SUNO_POLL_INTERVAL", "0"),
            ("SUNO_MAX_WAIT", "0"),
        ]))?;
        assert!(config.poll.poll_interval.is_zero());
        assert!(config.poll.max_wait.is_zero());
        Ok(())
    }

    #[test]
    fn debug_output_redacts_credential() {
        let config = SunoConfig::default().with_api_key("sk-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
