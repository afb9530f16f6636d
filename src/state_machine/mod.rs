// Registration state machine
//
// Tracks the agent's progress from power-on to a registered endpoint. The
// coordinator drives the startup transitions; the registration acknowledgment
// arrives later as a deferred task.

pub mod errors;
pub mod events;
pub mod registration_state_machine;
pub mod states;

pub use errors::{StateMachineError, StateMachineResult};
pub use events::RegistrationEvent;
pub use registration_state_machine::{RegistrationStateMachine, TransitionRecord};
pub use states::RegistrationState;
