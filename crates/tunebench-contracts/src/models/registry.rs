use std::fmt;

use indexmap::IndexMap;

/// Prompt limit applied in non-custom mode, independent of model.
pub const NON_CUSTOM_PROMPT_LIMIT: usize = 500;

pub const DEFAULT_SUNO_MODEL: &str = "V4_5ALL";

/// Request fields that carry a per-model character limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitedField {
    Prompt,
    Style,
    Title,
}

impl LimitedField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Style => "style",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for LimitedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub prompt_limit: usize,
    pub style_limit: usize,
    pub title_limit: usize,
}

impl ModelSpec {
    pub fn limit(&self, field: LimitedField) -> usize {
        match field {
            LimitedField::Prompt => self.prompt_limit,
            LimitedField::Style => self.style_limit,
            LimitedField::Title => self.title_limit,
        }
    }
}

/// Known Suno model versions and their character limits, in preference order.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    pub fn limit(&self, model: &str, field: LimitedField) -> Option<usize> {
        self.get(model).map(|spec| spec.limit(field))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    // V5: expressive, fastest. V4_5*: up to 8 min. V4: up to 4 min.
    let mut insert = |name: &str, prompt_limit: usize, style_limit: usize, title_limit: usize| {
        map.insert(
            name.to_string(),
            ModelSpec {
                name: name.to_string(),
                prompt_limit,
                style_limit,
                title_limit,
            },
        );
    };

    insert("V5", 5000, 1000, 100);
    insert("V4_5PLUS", 5000, 1000, 100);
    insert("V4_5ALL", 5000, 1000, 80);
    insert("V4_5", 5000, 1000, 100);
    insert("V4", 3000, 200, 80);

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_lists_models_in_preference_order() {
        let registry = ModelRegistry::default();
        assert_eq!(
            registry.names(),
            vec!["V5", "V4_5PLUS", "V4_5ALL", "V4_5", "V4"]
        );
        assert!(registry.contains(DEFAULT_SUNO_MODEL));
    }

    #[test]
    fn limits_are_keyed_by_model_and_field() {
        let registry = ModelRegistry::default();
        assert_eq!(registry.limit("V4", LimitedField::Prompt), Some(3000));
        assert_eq!(registry.limit("V4", LimitedField::Style), Some(200));
        assert_eq!(registry.limit("V4_5ALL", LimitedField::Title), Some(80));
        assert_eq!(registry.limit("V5", LimitedField::Title), Some(100));
        assert_eq!(registry.limit("V3", LimitedField::Prompt), None);
    }

    #[test]
    fn custom_registry_replaces_defaults() {
        let mut models = IndexMap::new();
        models.insert(
            "tiny".to_string(),
            ModelSpec {
                name: "tiny".to_string(),
                prompt_limit: 10,
                style_limit: 5,
                title_limit: 3,
            },
        );
        let registry = ModelRegistry::new(Some(models));
        assert_eq!(registry.names(), vec!["tiny"]);
        assert!(!registry.contains("V5"));
    }
}
