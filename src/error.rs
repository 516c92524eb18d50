//! Error types for fleet operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while talking to the fleet tools or the staging repository.
///
/// Deployment verdicts such as "agent not responding" are not errors; they are
/// [`DeployOutcome`](crate::monitor::DeployOutcome) values. These variants cover
/// the cases where no verdict could be reached at all.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The external tool could not be started
    #[error("Failed to run {program}: {source}")]
    Command {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// None of the configured staging directories exist
    #[error("Cannot find staging repo to get agent (searched: {searched})")]
    StagingNotFound { searched: String },

    /// The monitor descriptor has no agent element
    #[error("No agent defined in descriptor {}", path.display())]
    DescriptorMissing { path: PathBuf },

    /// The monitor descriptor could not be read or is not valid XML
    #[error("Failed to read descriptor {}: {reason}", path.display())]
    Descriptor { path: PathBuf, reason: String },

    /// Tool output did not follow the expected report layout
    #[error("Malformed {tool} output: {reason}")]
    Parse { tool: String, reason: String },

    /// Tool output carried none of the known marker codes
    #[error("Unrecognized {tool} output")]
    Unknown { tool: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DeployError>;
