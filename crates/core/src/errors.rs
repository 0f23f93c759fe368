use thiserror::Error;

/// Errors raised by the core while assembling or running a pipeline.
/// Destination failures are not listed here; they pass through untouched.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid name '{0}': nothing left after normalization")]
    InvalidName(String),

    #[error("Resource '{0}' is already registered in this source")]
    DuplicateResource(String),
}
