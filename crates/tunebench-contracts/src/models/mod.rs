mod registry;

pub use registry::{
    LimitedField, ModelRegistry, ModelSpec, DEFAULT_SUNO_MODEL, NON_CUSTOM_PROMPT_LIMIT,
};
