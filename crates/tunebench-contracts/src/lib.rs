pub mod events;
pub mod models;
pub mod prompts;
pub mod providers;
pub mod results;
pub mod runs;
