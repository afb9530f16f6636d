use super::{
    errors::{StateMachineError, StateMachineResult},
    events::RegistrationEvent,
    states::RegistrationState,
};
use crate::client::EndpointInfo;
use crate::logging::log_registration_transition;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// One applied transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub from: RegistrationState,
    pub to: RegistrationState,
    pub event: String,
    pub at: DateTime<Utc>,
}

/// Registration lifecycle owned by the coordinator
#[derive(Debug, Clone, Default)]
pub struct RegistrationStateMachine {
    state: RegistrationState,
    history: Vec<TransitionRecord>,
    endpoint: Option<EndpointInfo>,
    failure: Option<String>,
}

impl RegistrationStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_state(&self) -> RegistrationState {
        self.state
    }

    /// Endpoint identity, once registered
    pub fn endpoint(&self) -> Option<&EndpointInfo> {
        self.endpoint.as_ref()
    }

    /// Reason of the failure transition, if any
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    pub fn is_registered(&self) -> bool {
        self.state == RegistrationState::Registered
    }

    /// Whether `state` has been entered at some point
    pub fn has_visited(&self, state: RegistrationState) -> bool {
        self.history.iter().any(|record| record.to == state)
    }

    /// Attempt to transition the registration state
    pub fn transition(&mut self, event: RegistrationEvent) -> StateMachineResult<RegistrationState> {
        let current_state = self.state;
        let target_state = match Self::determine_target_state(current_state, &event) {
            Ok(target) => target,
            Err(err) => {
                warn!(
                    from = %current_state,
                    event = event.event_type(),
                    "Rejected registration transition"
                );
                return Err(err);
            }
        };

        match &event {
            RegistrationEvent::RegistrationAcknowledged(endpoint) => {
                self.endpoint = Some(endpoint.clone());
            }
            RegistrationEvent::Fail(reason) => {
                self.failure = Some(reason.clone());
            }
            _ => {}
        }

        self.history.push(TransitionRecord {
            from: current_state,
            to: target_state,
            event: event.event_type().to_string(),
            at: Utc::now(),
        });
        self.state = target_state;

        log_registration_transition(
            &current_state.to_string(),
            &target_state.to_string(),
            event.event_type(),
            event.error_message(),
        );

        Ok(target_state)
    }

    /// Determine the target state based on current state and event
    fn determine_target_state(
        current_state: RegistrationState,
        event: &RegistrationEvent,
    ) -> StateMachineResult<RegistrationState> {
        let target = match (current_state, event) {
            (RegistrationState::NotStarted, RegistrationEvent::BeginConnect) => {
                RegistrationState::Connecting
            }
            (RegistrationState::Connecting, RegistrationEvent::LinkEstablished) => {
                RegistrationState::ClientInitializing
            }
            (RegistrationState::ClientInitializing, RegistrationEvent::ResourcesDeclared) => {
                RegistrationState::ResourcesDeclared
            }
            (RegistrationState::ResourcesDeclared, RegistrationEvent::RegistrationRequested) => {
                RegistrationState::RegistrationPending
            }
            (
                RegistrationState::RegistrationPending,
                RegistrationEvent::RegistrationAcknowledged(_),
            ) => RegistrationState::Registered,

            (from_state, RegistrationEvent::Fail(_)) if from_state.can_fail() => {
                RegistrationState::Failed
            }

            (from_state, _) => {
                return Err(StateMachineError::InvalidTransition {
                    from: from_state,
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }
}
