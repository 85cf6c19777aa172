use std::time::Instant;

use anyhow::Result;
use serde_json::json;
use tracing::{info, warn};
use tunebench_contracts::events::{EventPayload, EventWriter, RunEvent};
use tunebench_contracts::prompts::PromptCase;
use tunebench_contracts::providers::{BackendRegistry, NamedBackend};
use tunebench_contracts::results::{GenerationResult, TrackRecord};
use tunebench_contracts::runs::report::ComparisonReport;
use uuid::Uuid;

use crate::local::LocalBackend;
use crate::suno::poller::CancellationToken;
use crate::suno::request::GenerationRequest;
use crate::suno::transport::{HttpTransport, SunoTransport};
use crate::suno::SunoClient;

pub const SUNO_LABEL: &str = "Suno";
pub const MUSICGEN_LABEL: &str = "MusicGen (Local)";

/// One side of the comparison. Errors are folded into the returned result.
pub trait ComparisonBackend: NamedBackend {
    fn label(&self) -> &str;
    fn run(&self, case: &PromptCase) -> GenerationResult;
}

pub struct SunoBackend<T: SunoTransport = HttpTransport> {
    client: SunoClient<T>,
    cancel: CancellationToken,
}

impl<T: SunoTransport> SunoBackend<T> {
    pub fn new(client: SunoClient<T>) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn client(&self) -> &SunoClient<T> {
        &self.client
    }
}

impl<T: SunoTransport> NamedBackend for SunoBackend<T> {
    fn name(&self) -> &str {
        "suno"
    }
}

impl<T: SunoTransport> ComparisonBackend for SunoBackend<T> {
    fn label(&self) -> &str {
        SUNO_LABEL
    }

    fn run(&self, case: &PromptCase) -> GenerationResult {
        let request = GenerationRequest::from(&case.suno);
        let prompt_chars = request.prompt_chars();
        let started = Instant::now();

        match self.client.generate(&request, &self.cancel) {
            Ok(generation) => GenerationResult::success(
                SUNO_LABEL,
                &case.name,
                &request.model,
                prompt_chars,
                started.elapsed().as_secs_f64(),
                generation
                    .tracks
                    .into_iter()
                    .map(TrackRecord::Remote)
                    .collect(),
            ),
            Err(err) => {
                warn!(prompt = %case.name, stage = %err.stage(), error = %err, "suno generation failed");
                GenerationResult::failure(
                    SUNO_LABEL,
                    &case.name,
                    Some(request.model.clone()),
                    prompt_chars,
                    err.to_string(),
                )
            }
        }
    }
}

pub struct MusicgenBackend {
    local: LocalBackend,
}

impl MusicgenBackend {
    pub fn new(local: LocalBackend) -> Self {
        Self { local }
    }
}

impl NamedBackend for MusicgenBackend {
    fn name(&self) -> &str {
        "musicgen"
    }
}

impl ComparisonBackend for MusicgenBackend {
    fn label(&self) -> &str {
        MUSICGEN_LABEL
    }

    fn run(&self, case: &PromptCase) -> GenerationResult {
        let config = &case.musicgen;
        let prompt_chars = config.prompt.chars().count();

        match self.local.generate(&config.prompt, config.duration_s) {
            Ok(generation) => GenerationResult::success(
                MUSICGEN_LABEL,
                &case.name,
                &generation.model,
                prompt_chars,
                generation.generation_time_s,
                vec![TrackRecord::Local(generation.to_track())],
            )
            .with_device(generation.device),
            Err(err) => {
                warn!(prompt = %case.name, error = %err, "local generation failed");
                GenerationResult::failure(
                    MUSICGEN_LABEL,
                    &case.name,
                    Some(self.local.model_name().to_string()),
                    prompt_chars,
                    err.to_string(),
                )
                .with_device(self.local.device())
            }
        }
    }
}

pub fn new_run_id() -> String {
    format!("run-{}", Uuid::new_v4().simple())
}

/// Runs every prompt on every registered backend, in registration order.
pub struct ComparisonRunner {
    backends: BackendRegistry<dyn ComparisonBackend>,
    events: Option<EventWriter>,
}

impl ComparisonRunner {
    pub fn new(backends: BackendRegistry<dyn ComparisonBackend>) -> Self {
        Self {
            backends,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventWriter) -> Self {
        self.events = Some(events);
        self
    }

    pub fn backends(&self) -> &BackendRegistry<dyn ComparisonBackend> {
        &self.backends
    }

    pub fn run(&self, cases: &[PromptCase], question: &str) -> Result<ComparisonReport> {
        let mut report = ComparisonReport::new(question, cases);
        let names: Vec<&str> = self.backends.iter().map(|backend| backend.name()).collect();
        self.emit(
            RunEvent::RunStarted,
            json!({
                "question": question,
                "total_prompts": cases.len(),
                "backends": names,
            }),
        )?;

        for (idx, case) in cases.iter().enumerate() {
            info!(
                prompt = %case.name,
                index = idx + 1,
                total = cases.len(),
                "running prompt"
            );
            for backend in self.backends.iter() {
                self.emit(
                    RunEvent::BackendStarted,
                    json!({"backend": backend.name(), "prompt_name": case.name}),
                )?;
                let result = backend.run(case);
                info!(
                    backend = backend.name(),
                    prompt = %case.name,
                    ok = result.is_ok(),
                    tracks = result.tracks_generated,
                    "backend finished"
                );
                self.emit(
                    RunEvent::BackendFinished,
                    json!({
                        "backend": backend.name(),
                        "prompt_name": case.name,
                        "ok": result.is_ok(),
                        "tracks_generated": result.tracks_generated,
                        "total_time_s": result.total_time_s,
                        "error": result.error,
                    }),
                )?;
                report.push(result);
            }
        }

        self.emit(
            RunEvent::RunFinished,
            json!({
                "total_results": report.results.len(),
                "succeeded": report.succeeded(),
            }),
        )?;
        Ok(report)
    }

    fn emit(&self, event: RunEvent, payload: serde_json::Value) -> Result<()> {
        if let Some(events) = &self.events {
            let payload: EventPayload = payload.as_object().cloned().unwrap_or_default();
            events.emit(event, payload)?;
        }
        Ok(())
    }
}
