//! Scenario loading errors.

use thiserror::Error;

/// Errors that stop a scenario before any step runs.
///
/// Step failures are never reported here; they are recorded in the
/// `StepOutcome` of the step that failed.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario definition validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Setting up the registry for the scenario failed.
    #[error("Setup error: {0}")]
    Setup(#[from] crate::capabilities::DispatchError),
}
