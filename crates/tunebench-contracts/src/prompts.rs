use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_SUNO_MODEL;

const DEFAULT_PROMPTS_JSON: &str = include_str!("../resources/default_prompts.json");

pub const DEFAULT_MUSICGEN_DURATION_S: u32 = 30;

/// One curated prompt, phrased for each backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptCase {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub suno: SunoPromptConfig,
    pub musicgen: MusicgenPromptConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunoPromptConfig {
    pub prompt: String,
    #[serde(default)]
    pub custom_mode: bool,
    #[serde(default)]
    pub instrumental: bool,
    pub style: Option<String>,
    pub title: Option<String>,
    #[serde(default = "default_suno_model")]
    pub model: String,
    pub persona_id: Option<String>,
    pub persona_model: Option<String>,
    pub negative_tags: Option<String>,
    pub vocal_gender: Option<String>,
    pub style_weight: Option<f64>,
    pub weirdness_constraint: Option<f64>,
    pub audio_weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicgenPromptConfig {
    pub prompt: String,
    #[serde(default = "default_duration")]
    pub duration_s: u32,
}

fn default_suno_model() -> String {
    DEFAULT_SUNO_MODEL.to_string()
}

fn default_duration() -> u32 {
    DEFAULT_MUSICGEN_DURATION_S
}

/// The built-in corpus of early-2000s pop prompts.
pub fn default_corpus() -> anyhow::Result<Vec<PromptCase>> {
    parse_corpus(DEFAULT_PROMPTS_JSON).context("embedded prompt corpus is invalid")
}

pub fn load_corpus(path: &Path) -> anyhow::Result<Vec<PromptCase>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading prompt corpus {}", path.display()))?;
    parse_corpus(&raw).with_context(|| format!("invalid prompt corpus {}", path.display()))
}

fn parse_corpus(raw: &str) -> anyhow::Result<Vec<PromptCase>> {
    let cases: Vec<PromptCase> = serde_json::from_str(raw)?;
    if cases.is_empty() {
        bail!("prompt corpus is empty");
    }
    for case in &cases {
        if case.name.trim().is_empty() {
            bail!("prompt case name must not be empty");
        }
    }
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_corpus_has_three_pop_prompts() -> anyhow::Result<()> {
        let cases = default_corpus()?;
        assert_eq!(cases.len(), 3);
        assert!(cases.iter().all(|case| case.name.starts_with("2000s Pop")));
        let first = &cases[0];
        assert!(first.suno.custom_mode);
        assert_eq!(first.suno.title.as_deref(), Some("Bubblegum Dreams"));
        assert_eq!(first.suno.vocal_gender.as_deref(), Some("f"));
        assert_eq!(first.musicgen.duration_s, 30);
        Ok(())
    }

    #[test]
    fn load_corpus_applies_defaults() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("prompts.json");
        std::fs::write(
            &path,
            r#"[{"name": "lofi", "suno": {"prompt": "lofi beat"}, "musicgen": {"prompt": "lofi beat"}}]"#,
        )?;
        let cases = load_corpus(&path)?;
        assert_eq!(cases.len(), 1);
        assert!(!cases[0].suno.custom_mode);
        assert_eq!(cases[0].suno.model, DEFAULT_SUNO_MODEL);
        assert_eq!(cases[0].musicgen.duration_s, DEFAULT_MUSICGEN_DURATION_S);
        assert_eq!(cases[0].description, "");
        Ok(())
    }

    #[test]
    fn empty_corpus_is_rejected() {
        assert!(parse_corpus("[]").is_err());
    }
}
