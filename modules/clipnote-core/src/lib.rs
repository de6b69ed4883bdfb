pub mod classify;
pub mod error;
pub mod fetch;
pub mod linkify;
pub mod merge;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod route;

pub use error::OrchestratorError;
pub use orchestrator::Orchestrator;
