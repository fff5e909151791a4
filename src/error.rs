use thiserror::Error;

use crate::core::Pid;

/// Reasons a run is refused. Every variant is raised before the simulation
/// starts; a run that starts always completes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("invalid process request P{id}: {reason}")]
    InvalidProcessRequest { id: Pid, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no process requests to schedule")]
    NoProcesses,
}
