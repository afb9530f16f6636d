use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a single connection attempt reported by the bearer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "code", rename_all = "snake_case")]
pub enum ConnectOutcome {
    /// Link is up
    Connected,
    /// Credentials rejected (SIM PIN, APN user/password)
    AuthenticationFailure,
    /// Temporary failure, e.g. no coverage yet
    TransientFailure(i32),
    /// Failure the bearer considers fatal for this attempt
    FatalFailure(i32),
}

impl ConnectOutcome {
    /// Numeric status code, `0` for success
    pub fn code(&self) -> i32 {
        match self {
            Self::Connected => 0,
            Self::AuthenticationFailure => crate::constants::network::AUTH_FAILURE_CODE,
            Self::TransientFailure(code) | Self::FatalFailure(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::AuthenticationFailure => write!(f, "authentication_failure"),
            Self::TransientFailure(code) => write!(f, "transient_failure({code})"),
            Self::FatalFailure(code) => write!(f, "fatal_failure({code})"),
        }
    }
}

/// The network bearer (cellular modem, ethernet, ...).
///
/// Implementations own credentials and modem setup; the agent only drives
/// connection attempts and reads diagnostics.
pub trait NetworkLink {
    /// Issue one connection attempt.
    fn connect(&mut self) -> ConnectOutcome;

    /// Whether the link currently reports itself as up.
    fn is_connected(&self) -> bool;

    /// Free-form device information (modem revision and similar).
    fn device_info(&self) -> Option<String>;
}

impl<L: NetworkLink + ?Sized> NetworkLink for Box<L> {
    fn connect(&mut self) -> ConnectOutcome {
        (**self).connect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn device_info(&self) -> Option<String> {
        (**self).device_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_codes() {
        assert_eq!(ConnectOutcome::Connected.code(), 0);
        assert_eq!(ConnectOutcome::TransientFailure(-3004).code(), -3004);
        assert_eq!(ConnectOutcome::AuthenticationFailure.code(), -3018);
        assert!(!ConnectOutcome::FatalFailure(-3012).is_success());
    }

    #[test]
    fn test_outcome_serde() {
        let json = serde_json::to_string(&ConnectOutcome::TransientFailure(-3004)).unwrap();
        assert_eq!(json, r#"{"type":"transient_failure","code":-3004}"#);
    }
}
