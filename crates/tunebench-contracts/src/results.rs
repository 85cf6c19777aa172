use serde::{Deserialize, Serialize};

/// Console marker for a field the backend did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// One track returned by the remote service.
///
/// Fields the service omitted stay `None` and serialize as `null`, so every
/// record carries the same keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeneratedTrack {
    pub title: Option<String>,
    pub tags: Option<String>,
    pub duration_s: Option<f64>,
    pub model_name: Option<String>,
    pub audio_url: Option<String>,
    pub stream_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<String>,
}

/// One audio file written by the local backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalTrack {
    pub output_file: String,
    pub file_size_kb: f64,
    pub duration_actual_s: f64,
    pub duration_requested_s: u32,
}

/// Full metadata of a standalone local generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRunRecord {
    pub prompt: String,
    pub model: String,
    pub device: String,
    pub duration_requested_s: u32,
    pub duration_actual_s: f64,
    pub output_file: String,
    pub file_size_bytes: u64,
    pub generation_time_s: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackRecord {
    Local(LocalTrack),
    Remote(GeneratedTrack),
}

/// Uniform outcome of one prompt on one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(rename = "api")]
    pub backend: String,
    pub prompt_name: String,
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub prompt_chars: usize,
    pub total_time_s: Option<f64>,
    pub tracks_generated: usize,
    pub error: Option<String>,
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
}

impl GenerationResult {
    pub fn success(
        backend: impl Into<String>,
        prompt_name: impl Into<String>,
        model: impl Into<String>,
        prompt_chars: usize,
        total_time_s: f64,
        tracks: Vec<TrackRecord>,
    ) -> Self {
        Self {
            backend: backend.into(),
            prompt_name: prompt_name.into(),
            model: Some(model.into()),
            device: None,
            prompt_chars,
            total_time_s: Some(round_millis(total_time_s)),
            tracks_generated: tracks.len(),
            error: None,
            tracks,
        }
    }

    pub fn failure(
        backend: impl Into<String>,
        prompt_name: impl Into<String>,
        model: Option<String>,
        prompt_chars: usize,
        error: impl Into<String>,
    ) -> Self {
        Self {
            backend: backend.into(),
            prompt_name: prompt_name.into(),
            model,
            device: None,
            prompt_chars,
            total_time_s: None,
            tracks_generated: 0,
            error: Some(error.into()),
            tracks: Vec::new(),
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}
