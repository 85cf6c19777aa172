use tunebench_contracts::models::DEFAULT_SUNO_MODEL;
use tunebench_contracts::prompts::SunoPromptConfig;

/// Optional tuning knobs forwarded to the API only when set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtendedParams {
    pub persona_id: Option<String>,
    pub persona_model: Option<String>,
    pub negative_tags: Option<String>,
    pub vocal_gender: Option<String>,
    pub style_weight: Option<f64>,
    pub weirdness_constraint: Option<f64>,
    pub audio_weight: Option<f64>,
}

/// Parameters for one Suno generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub custom_mode: bool,
    pub instrumental: bool,
    pub style: Option<String>,
    pub title: Option<String>,
    pub model: String,
    pub extended: ExtendedParams,
}

impl GenerationRequest {
    /// Prompt-only request on the default model.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            custom_mode: false,
            instrumental: false,
            style: None,
            title: None,
            model: DEFAULT_SUNO_MODEL.to_string(),
            extended: ExtendedParams::default(),
        }
    }

    /// Custom-mode request with explicit style and title.
    pub fn custom(
        prompt: impl Into<String>,
        style: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            custom_mode: true,
            style: Some(style.into()),
            title: Some(title.into()),
            ..Self::new(prompt)
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn instrumental(mut self, instrumental: bool) -> Self {
        self.instrumental = instrumental;
        self
    }

    pub fn with_extended(mut self, extended: ExtendedParams) -> Self {
        self.extended = extended;
        self
    }

    pub fn prompt_chars(&self) -> usize {
        self.prompt.chars().count()
    }
}

impl From<&SunoPromptConfig> for GenerationRequest {
    fn from(config: &SunoPromptConfig) -> Self {
        Self {
            prompt: config.prompt.clone(),
            custom_mode: config.custom_mode,
            instrumental: config.instrumental,
            style: config.style.clone(),
            title: config.title.clone(),
            model: config.model.clone(),
            extended: ExtendedParams {
                persona_id: config.persona_id.clone(),
                persona_model: config.persona_model.clone(),
                negative_tags: config.negative_tags.clone(),
                vocal_gender: config.vocal_gender.clone(),
                style_weight: config.style_weight,
                weirdness_constraint: config.weirdness_constraint,
                audio_weight: config.audio_weight,
            },
        }
    }
}
