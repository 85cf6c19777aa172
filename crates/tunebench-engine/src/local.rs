use std::f32::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;
use tunebench_contracts::prompts::DEFAULT_MUSICGEN_DURATION_S;
use tunebench_contracts::results::{LocalRunRecord, LocalTrack};

pub const DEFAULT_MODEL_NAME: &str = "facebook/musicgen-small";
pub const DEFAULT_OUTPUT_DIR: &str = "generated_music";
pub const SAMPLE_RATE: u32 = 32_000;
pub const MAX_PROMPT_CHARS: usize = 1500;
pub const MIN_DURATION_S: u32 = 1;
pub const MAX_DURATION_S: u32 = 120;
pub const DEFAULT_DURATION_S: u32 = DEFAULT_MUSICGEN_DURATION_S;
const FILE_STEM_PROMPT_CHARS: usize = 40;

#[derive(Debug, Error)]
pub enum LocalError {
    #[error("prompt is required and cannot be empty")]
    EmptyPrompt,
    #[error("prompt exceeds {limit} characters (got {len})")]
    PromptTooLong { len: usize, limit: usize },
    #[error(
        "duration_s must be between {min} and {max} (got {duration_s})",
        min = MIN_DURATION_S,
        max = MAX_DURATION_S
    )]
    DurationOutOfRange { duration_s: u32 },
    #[error("model {model} failed: {message}")]
    Model { model: String, message: String },
    #[error("model {model} returned no audio")]
    EmptyAudio { model: String },
    #[error("failed writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed encoding {}: {source}", .path.display())]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalConfig {
    pub output_dir: PathBuf,
    pub model_name: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

/// Mono float samples at a fixed rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn duration_s(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Text-to-audio model running on this machine.
pub trait MusicModel: Send + Sync {
    fn name(&self) -> &str;
    fn device(&self) -> &str;
    fn generate(&self, prompt: &str, duration_s: u32) -> Result<AudioClip, LocalError>;
}

/// Offline stand-in: a few sine voices whose pitches are seeded from the prompt.
pub struct DryrunMusicModel {
    name: String,
}

impl DryrunMusicModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for DryrunMusicModel {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_NAME)
    }
}

impl MusicModel for DryrunMusicModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn device(&self) -> &str {
        "cpu"
    }

    fn generate(&self, prompt: &str, duration_s: u32) -> Result<AudioClip, LocalError> {
        let voices = voices_from_prompt(prompt);
        let total = SAMPLE_RATE as usize * duration_s as usize;
        let fade = (SAMPLE_RATE as usize / 20).max(1);
        let samples = (0..total)
            .map(|idx| {
                let t = idx as f32 / SAMPLE_RATE as f32;
                let mix: f32 = voices
                    .iter()
                    .map(|&(freq, gain)| gain * (TAU * freq * t).sin())
                    .sum();
                let edge = idx.min(total - 1 - idx);
                let envelope = (edge as f32 / fade as f32).min(1.0);
                mix * envelope
            })
            .collect();
        Ok(AudioClip {
            samples,
            sample_rate: SAMPLE_RATE,
        })
    }
}

fn voices_from_prompt(prompt: &str) -> [(f32, f32); 3] {
    let digest = Sha256::digest(prompt.as_bytes());
    let root = 110.0 + f32::from(digest[0]) * 1.5;
    [
        (root, 0.25),
        (root * 1.25 + f32::from(digest[1] % 8), 0.15),
        (root * 1.5 + f32::from(digest[2] % 8), 0.1),
    ]
}

/// Outcome of one local generation.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalGeneration {
    pub prompt: String,
    pub model: String,
    pub device: String,
    pub duration_requested_s: u32,
    pub duration_actual_s: f64,
    pub output_file: PathBuf,
    pub file_size_bytes: u64,
    pub generation_time_s: f64,
    pub created_at: String,
}

impl LocalGeneration {
    pub fn to_track(&self) -> LocalTrack {
        LocalTrack {
            output_file: self.output_file.to_string_lossy().to_string(),
            file_size_kb: (self.file_size_bytes as f64 / 1024.0 * 10.0).round() / 10.0,
            duration_actual_s: self.duration_actual_s,
            duration_requested_s: self.duration_requested_s,
        }
    }

    pub fn to_record(&self) -> LocalRunRecord {
        LocalRunRecord {
            prompt: self.prompt.clone(),
            model: self.model.clone(),
            device: self.device.clone(),
            duration_requested_s: self.duration_requested_s,
            duration_actual_s: self.duration_actual_s,
            output_file: self.output_file.to_string_lossy().to_string(),
            file_size_bytes: self.file_size_bytes,
            generation_time_s: self.generation_time_s,
            created_at: self.created_at.clone(),
        }
    }
}

pub struct LocalBackend {
    config: LocalConfig,
    model: Box<dyn MusicModel>,
}

impl LocalBackend {
    pub fn new(config: LocalConfig, model: Box<dyn MusicModel>) -> Self {
        Self { config, model }
    }

    pub fn dryrun(config: LocalConfig) -> Self {
        let model = DryrunMusicModel::new(config.model_name.clone());
        Self::new(config, Box::new(model))
    }

    pub fn config(&self) -> &LocalConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn device(&self) -> &str {
        self.model.device()
    }

    /// Validates, runs the model and writes a timestamped WAV under the output dir.
    pub fn generate(&self, prompt: &str, duration_s: u32) -> Result<LocalGeneration, LocalError> {
        self.generate_to(prompt, duration_s, None)
    }

    pub fn generate_to(
        &self,
        prompt: &str,
        duration_s: u32,
        file_name: Option<&str>,
    ) -> Result<LocalGeneration, LocalError> {
        validate_local_params(prompt, duration_s)?;

        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|source| LocalError::Io {
            path: output_dir.clone(),
            source,
        })?;
        let now = Local::now();
        let output_file = output_dir.join(
            file_name
                .map(str::to_string)
                .unwrap_or_else(|| output_file_name(prompt, &now)),
        );

        info!(
            model = self.model.name(),
            device = self.model.device(),
            duration_s,
            "generating local audio"
        );
        let started = Instant::now();
        let clip = self.model.generate(prompt, duration_s)?;
        if clip.samples.is_empty() {
            return Err(LocalError::EmptyAudio {
                model: self.model.name().to_string(),
            });
        }
        let generation_time_s = round_to(started.elapsed().as_secs_f64(), 3);

        write_wav(&output_file, &clip)?;
        let file_size_bytes = fs::metadata(&output_file)
            .map_err(|source| LocalError::Io {
                path: output_file.clone(),
                source,
            })?
            .len();
        info!(
            output = %output_file.display(),
            size_kb = file_size_bytes / 1024,
            generation_time_s,
            "local audio saved"
        );

        Ok(LocalGeneration {
            prompt: prompt.to_string(),
            model: self.model.name().to_string(),
            device: self.model.device().to_string(),
            duration_requested_s: duration_s,
            duration_actual_s: round_to(clip.duration_s(), 2),
            output_file,
            file_size_bytes,
            generation_time_s,
            created_at: now.to_rfc3339(),
        })
    }
}

pub fn validate_local_params(prompt: &str, duration_s: u32) -> Result<(), LocalError> {
    if prompt.trim().is_empty() {
        return Err(LocalError::EmptyPrompt);
    }
    let len = prompt.chars().count();
    if len > MAX_PROMPT_CHARS {
        return Err(LocalError::PromptTooLong {
            len,
            limit: MAX_PROMPT_CHARS,
        });
    }
    if !(MIN_DURATION_S..=MAX_DURATION_S).contains(&duration_s) {
        return Err(LocalError::DurationOutOfRange { duration_s });
    }
    Ok(())
}

/// `{YYYYmmdd_HHMMSS}_{stem}.wav`; the stem keeps word characters of the first 40 prompt chars.
pub fn output_file_name(prompt: &str, now: &DateTime<Local>) -> String {
    let stem: String = prompt
        .chars()
        .take(FILE_STEM_PROMPT_CHARS)
        .map(|ch| if matches!(ch, ' ' | '/' | '\\') { '_' } else { ch })
        .filter(|ch| ch.is_alphanumeric() || *ch == '_')
        .collect();
    format!("{}_{stem}.wav", now.format("%Y%m%d_%H%M%S"))
}

/// Mono 32-bit float WAV.
pub fn write_wav(path: &Path, clip: &AudioClip) -> Result<(), LocalError> {
    let wav_error = |source: hound::Error| LocalError::Wav {
        path: path.to_path_buf(),
        source,
    };
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(wav_error)?;
    for &sample in &clip.samples {
        writer.write_sample(sample).map_err(wav_error)?;
    }
    writer.finalize().map_err(wav_error)?;
    Ok(())
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
