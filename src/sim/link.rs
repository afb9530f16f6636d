use crate::config::SimulationConfig;
use crate::connectivity::{ConnectOutcome, NetworkLink};
use crate::constants::network::NO_CONNECTION_CODE;
use tracing::debug;

/// Bearer that fails a fixed number of times before coming up
#[derive(Debug, Clone, Default)]
pub struct SimulatedLink {
    failures_remaining: u32,
    reject_credentials: bool,
    connected: bool,
    attempts: u32,
}

impl SimulatedLink {
    pub fn new(transient_failures: u32) -> Self {
        Self {
            failures_remaining: transient_failures,
            ..Self::default()
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            reject_credentials: config.auth_failure,
            ..Self::new(config.transient_failures)
        }
    }

    /// Reject credentials on every attempt
    pub fn rejecting_credentials() -> Self {
        Self {
            reject_credentials: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl NetworkLink for SimulatedLink {
    fn connect(&mut self) -> ConnectOutcome {
        self.attempts += 1;
        if self.reject_credentials {
            return ConnectOutcome::AuthenticationFailure;
        }
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            debug!(remaining = self.failures_remaining, "Simulated link not ready");
            return ConnectOutcome::TransientFailure(NO_CONNECTION_CODE);
        }
        self.connected = true;
        ConnectOutcome::Connected
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn device_info(&self) -> Option<String> {
        Some(format!(
            "Simulated modem rev 1.0 ({} connection attempt(s))",
            self.attempts
        ))
    }
}
