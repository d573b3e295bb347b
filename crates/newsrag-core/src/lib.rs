//! Configuration, secrets, retrieval-augmented answering, and the build/ask
//! pipeline that ties the loader, index and remote model together.

pub mod config;
pub mod pipeline;
pub mod qa;
pub mod vault;

pub use config::Config;
pub use pipeline::{BuildOutcome, BuildReport, FailedUrl, Pipeline, PipelineError};
pub use qa::{AnswerResult, QaError};
