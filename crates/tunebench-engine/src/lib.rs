pub mod compare;
pub mod config;
pub mod local;
pub mod suno;

pub use compare::{
    new_run_id, ComparisonBackend, ComparisonRunner, MusicgenBackend, SunoBackend,
};
pub use config::SunoConfig;
pub use local::{LocalBackend, LocalConfig, LocalError, MusicModel};
pub use suno::error::{Stage, SunoError, ValidationError};
pub use suno::poller::{CancellationToken, PollSettings};
pub use suno::request::{ExtendedParams, GenerationRequest};
pub use suno::{SubmittedTask, SunoClient, SunoGeneration};
