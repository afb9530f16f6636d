//! # Registration Coordinator
//!
//! Top-level startup sequence of the agent:
//!
//! ```text
//! NotStarted ─▶ Connecting ─▶ ClientInitializing ─▶ ResourcesDeclared
//!                   │                 │                     │
//!                   ▼                 ▼                     ▼
//!                 Failed ◀───────── Failed ◀──────── RegistrationPending ─▶ Registered
//! ```
//!
//! Startup runs synchronously on the calling thread. Once registration has
//! been requested, the coordinator hands the thread to the deferred queue and
//! everything else (acknowledgment, inbound operations, timer ticks) arrives
//! as tasks.

pub mod registration_coordinator;

pub use registration_coordinator::{RegistrationCoordinator, REGISTRATION_TIMEOUT_REASON};
