use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration lifecycle of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    /// Power-on, nothing attempted yet
    #[default]
    NotStarted,
    /// Network link being brought up
    Connecting,
    /// Link up, management client initializing
    ClientInitializing,
    /// Client ready and every resource created
    ResourcesDeclared,
    /// Registration requested, waiting for the remote acknowledgment
    RegistrationPending,
    /// Endpoint registered with the management service
    Registered,
    /// Startup aborted
    Failed,
}

impl RegistrationState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Registered | Self::Failed)
    }

    /// Check if the agent is still working through startup
    pub fn is_starting(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::ClientInitializing | Self::ResourcesDeclared
        )
    }

    /// States from which a failure transition is allowed
    pub fn can_fail(&self) -> bool {
        matches!(
            self,
            Self::Connecting
                | Self::ClientInitializing
                | Self::ResourcesDeclared
                | Self::RegistrationPending
        )
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Connecting => write!(f, "connecting"),
            Self::ClientInitializing => write!(f, "client_initializing"),
            Self::ResourcesDeclared => write!(f, "resources_declared"),
            Self::RegistrationPending => write!(f, "registration_pending"),
            Self::Registered => write!(f, "registered"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for RegistrationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "connecting" => Ok(Self::Connecting),
            "client_initializing" => Ok(Self::ClientInitializing),
            "resources_declared" => Ok(Self::ResourcesDeclared),
            "registration_pending" => Ok(Self::RegistrationPending),
            "registered" => Ok(Self::Registered),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid registration state: {s}")),
        }
    }
}
