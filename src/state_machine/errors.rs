use super::states::RegistrationState;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    #[error("Invalid transition from {from} on {event}")]
    InvalidTransition {
        from: RegistrationState,
        event: String,
    },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;
