//! # Actuator Handler
//!
//! Plays a colon-delimited timing pattern (`d0:d1:...:dn`, milliseconds) on a
//! binary output: wait `d_i`, toggle, repeat. The whole pattern blocks the
//! calling context, so it only ever runs as a deferred task.

pub mod handler;
pub mod output;
pub mod pattern;

pub use handler::{ActuatorHandler, BlinkReport};
pub use output::{BinaryOutput, VirtualOutput};
pub use pattern::{parse_delay_ms, BlinkPattern};
