use super::backoff::BackoffPolicy;
use super::link::{ConnectOutcome, NetworkLink};
use crate::clock::{Sleeper, ThreadSleeper};
use crate::logging::log_connection_attempt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Successful connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connected {
    /// Number of `connect` calls issued, `0` if the link was already up
    pub attempts: u32,
}

/// Errors reported by the connectivity manager
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// Credentials rejected, never retried
    #[error("Authentication failure (code {code})")]
    Auth { code: i32 },

    /// Retries used up
    #[error("Fatal connection failure after {attempts} attempts (last code {last_code})")]
    Exhausted { attempts: u32, last_code: i32 },

    /// Retryable failure, handled inside the retry loop
    #[error("Transient connection failure (code {code})")]
    Transient { code: i32 },
}

impl ConnectError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// How the retry loop treats one attempt outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptClass {
    Success,
    Retry(ConnectError),
    Fatal(ConnectError),
}

/// Classify a single outcome. Only authentication failures are fatal on
/// their own; every other failure code goes through the retry budget.
pub fn classify_outcome(outcome: ConnectOutcome) -> AttemptClass {
    match outcome {
        ConnectOutcome::Connected => AttemptClass::Success,
        ConnectOutcome::AuthenticationFailure => AttemptClass::Fatal(ConnectError::Auth {
            code: outcome.code(),
        }),
        ConnectOutcome::TransientFailure(code) | ConnectOutcome::FatalFailure(code) => {
            AttemptClass::Retry(ConnectError::Transient { code })
        }
    }
}

/// Drives connection attempts against a [`NetworkLink`]
pub struct ConnectivityManager<L> {
    link: L,
    backoff: BackoffPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<L: NetworkLink> ConnectivityManager<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            backoff: BackoffPolicy::immediate(),
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Connect, retrying non-authentication failures until the retry counter
    /// exceeds `max_retries`.
    pub fn connect(&mut self, max_retries: u32) -> Result<Connected, ConnectError> {
        let mut attempts: u32 = 0;
        let mut retry_counter: u32 = 0;

        while !self.link.is_connected() {
            attempts += 1;
            let outcome = self.link.connect();
            log_connection_attempt(attempts, retry_counter, &outcome.to_string(), outcome.code());

            match classify_outcome(outcome) {
                AttemptClass::Success => {
                    info!(attempts = attempts, "📶 Connection established");
                    return Ok(Connected { attempts });
                }
                AttemptClass::Fatal(err) => {
                    error!(attempts = attempts, error = %err, "Authentication failure, giving up");
                    return Err(err);
                }
                AttemptClass::Retry(_) if retry_counter > max_retries => {
                    let err = ConnectError::Exhausted {
                        attempts,
                        last_code: outcome.code(),
                    };
                    error!(attempts = attempts, error = %err, "Fatal connection failure");
                    return Err(err);
                }
                AttemptClass::Retry(err) => {
                    retry_counter += 1;
                    let delay = self.backoff.delay_for(retry_counter);
                    warn!(
                        attempts = attempts,
                        retry = retry_counter,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Couldn't connect, will retry"
                    );
                    self.sleeper.sleep(delay);
                }
            }
        }

        info!(attempts = attempts, "📶 Link reports connected");
        Ok(Connected { attempts })
    }

    /// Log the device information banner of the link
    pub fn log_device_info(&self) -> Option<String> {
        match self.link.device_info() {
            Some(info) => {
                info!(device_info = %info, "Modem info");
                Some(info)
            }
            None => {
                warn!("Device info unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ScriptedLink {
        outcomes: VecDeque<ConnectOutcome>,
        connected: bool,
        calls: u32,
    }

    impl ScriptedLink {
        fn new(outcomes: Vec<ConnectOutcome>) -> Self {
            Self {
                outcomes: outcomes.into(),
                connected: false,
                calls: 0,
            }
        }
    }

    impl NetworkLink for ScriptedLink {
        fn connect(&mut self) -> ConnectOutcome {
            self.calls += 1;
            let outcome = self
                .outcomes
                .pop_front()
                .unwrap_or(ConnectOutcome::TransientFailure(-3004));
            self.connected = outcome.is_success();
            outcome
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn device_info(&self) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify_outcome(ConnectOutcome::Connected), AttemptClass::Success);
        assert!(matches!(
            classify_outcome(ConnectOutcome::AuthenticationFailure),
            AttemptClass::Fatal(ConnectError::Auth { .. })
        ));
        assert!(matches!(
            classify_outcome(ConnectOutcome::FatalFailure(-3012)),
            AttemptClass::Retry(ConnectError::Transient { code: -3012 })
        ));
    }

    #[test]
    fn test_classification_owns_the_error() {
        let class = classify_outcome(ConnectOutcome::TransientFailure(-3004));
        let retained = class.clone();
        let AttemptClass::Retry(err) = class else {
            panic!("transient failure should be retried");
        };
        assert!(err.is_retryable());
        assert_eq!(retained, AttemptClass::Retry(ConnectError::Transient { code: -3004 }));
    }

    #[test]
    fn test_exhaustion_attempt_count() {
        let mut manager = ConnectivityManager::new(ScriptedLink::new(vec![]));
        let err = manager.connect(3).unwrap_err();
        assert_eq!(
            err,
            ConnectError::Exhausted {
                attempts: 5,
                last_code: -3004
            }
        );
        assert_eq!(manager.link().calls, 5);
    }

    #[test]
    fn test_auth_failure_stops_immediately() {
        let mut manager = ConnectivityManager::new(ScriptedLink::new(vec![
            ConnectOutcome::TransientFailure(-3004),
            ConnectOutcome::AuthenticationFailure,
            ConnectOutcome::Connected,
        ]));
        assert!(matches!(manager.connect(3), Err(ConnectError::Auth { .. })));
        assert_eq!(manager.link().calls, 2);
    }

    #[test]
    fn test_already_connected_skips_attempts() {
        let mut link = ScriptedLink::new(vec![]);
        link.connected = true;
        let mut manager = ConnectivityManager::new(link);
        assert_eq!(manager.connect(3).unwrap(), Connected { attempts: 0 });
        assert_eq!(manager.link().calls, 0);
    }
}
