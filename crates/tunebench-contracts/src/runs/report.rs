use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::prompts::PromptCase;
use crate::results::{GenerationResult, LocalRunRecord};

pub const DEFAULT_QUESTION: &str = "Q2: Prompt Engineering";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRef {
    pub name: String,
    pub description: String,
}

/// Everything one comparison run produced, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub question: String,
    pub timestamp: String,
    pub total_prompts: usize,
    pub prompts: Vec<PromptRef>,
    pub results: Vec<GenerationResult>,
}

impl ComparisonReport {
    pub fn new(question: impl Into<String>, cases: &[PromptCase]) -> Self {
        Self {
            question: question.into(),
            timestamp: now_utc_iso(),
            total_prompts: cases.len(),
            prompts: cases
                .iter()
                .map(|case| PromptRef {
                    name: case.name.clone(),
                    description: case.description.clone(),
                })
                .collect(),
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: GenerationResult) {
        self.results.push(result);
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|result| result.is_ok()).count()
    }
}

/// Results of `local` runs outside a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRunReport {
    pub api: String,
    pub model: String,
    pub device: String,
    pub total_generations: usize,
    pub results: Vec<LocalRunRecord>,
}

impl LocalRunReport {
    pub fn new(
        api: impl Into<String>,
        model: impl Into<String>,
        device: impl Into<String>,
        results: Vec<LocalRunRecord>,
    ) -> Self {
        Self {
            api: api.into(),
            model: model.into(),
            device: device.into(),
            total_generations: results.len(),
            results,
        }
    }
}

/// Writes any report as pretty JSON, creating parent directories.
pub fn write_report<T: Serialize>(path: &Path, report: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
