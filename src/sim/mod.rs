//! # Simulated Collaborators
//!
//! Stand-ins for the network bearer and the management service, so the agent
//! runs end to end on a workstation. Behaviour comes from
//! [`SimulationConfig`](crate::config::SimulationConfig).

pub mod client;
pub mod link;

pub use client::{SimulatedClient, SimulatedNotificationSink};
pub use link::SimulatedLink;
