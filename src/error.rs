use crate::client::ClientInitError;
use crate::config::ConfigurationError;
use crate::connectivity::ConnectError;
use crate::registry::RegistryError;
use crate::state_machine::StateMachineError;

/// Top-level error for agent startup and the dispatch lifecycle.
///
/// Everything surfaced here is fatal: the coordinator logs it and stops.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Network connection failed: {0}")]
    Connect(#[from] ConnectError),

    #[error("Initializing management client failed: {0}")]
    ClientInit(#[from] ClientInitError),

    #[error("Resource declaration failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Registration state error: {0}")]
    StateMachine(#[from] StateMachineError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Registration not acknowledged within {timeout_ms}ms")]
    RegistrationTimeout { timeout_ms: u64 },

    #[error("Dispatch loop stopped: {reason}")]
    DispatchStopped { reason: String },
}

impl AgentError {
    /// Process exit code reported by the binary for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Connect(ConnectError::Auth { .. }) => 2,
            Self::Connect(_) => 3,
            Self::ClientInit(_) => 4,
            Self::Registry(_) | Self::StateMachine(_) => 5,
            Self::Configuration(_) => 6,
            Self::RegistrationTimeout { .. } => 7,
            Self::DispatchStopped { .. } => 8,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
