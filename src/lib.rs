#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Device Agent
//!
//! Device-side core of a remotely managed embedded node.
//!
//! ## Overview
//!
//! The agent brings a network link up under a retry policy, declares the
//! device's addressable resources, registers with a remote management service
//! and then serves remote reads, writes and actions on those resources. All
//! work after startup runs on a single cooperative dispatch loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    RegistrationCoordinator                      │
//! │  connect ─▶ init client ─▶ declare resources ─▶ register        │
//! └───────┬─────────────────────┬─────────────────────┬─────────────┘
//!         │                     │                     │
//!  ConnectivityManager   ManagementClient      DeferredQueue<AgentContext>
//!   (NetworkLink)         (external)            ├─ ResourceRegistry
//!                                               ├─ RegistrationStateMachine
//!                                               └─ tasks from tickers, the
//!                                                  client and timeouts
//! ```
//!
//! ## Module Organization
//!
//! - [`connectivity`] - Link bring-up with retry classification and backoff
//! - [`registry`] - Addressable resources, method masks and notifications
//! - [`state_machine`] - Registration lifecycle
//! - [`coordinator`] - Startup sequencing and the dispatch loop
//! - [`dispatch`] - Deferred FIFO queue and periodic tickers
//! - [`actuator`] - Blink pattern playback on a binary output
//! - [`client`] - Management client interface
//! - [`resources`] - The reference resource set
//! - [`sim`] - Simulated link and management service
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured console and file logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use device_agent::actuator::{ActuatorHandler, VirtualOutput};
//! use device_agent::config::AgentConfig;
//! use device_agent::coordinator::RegistrationCoordinator;
//! use device_agent::resources::ReferenceResources;
//! use device_agent::sim::{SimulatedClient, SimulatedLink};
//! use std::sync::Arc;
//!
//! let config = AgentConfig::default();
//! let actuator = Arc::new(ActuatorHandler::new(VirtualOutput::new("led1")));
//! let resources = ReferenceResources::new(actuator, config.resources.initial_blink_pattern.as_str());
//! let link = SimulatedLink::from_config(&config.simulation);
//! let client = SimulatedClient::from_config(&config.simulation);
//!
//! let coordinator = RegistrationCoordinator::new(config, link, client, resources);
//! if let Err(err) = coordinator.run() {
//!     std::process::exit(err.exit_code());
//! }
//! ```

pub mod actuator;
pub mod client;
pub mod clock;
pub mod config;
pub mod connectivity;
pub mod constants;
pub mod context;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod registry;
pub mod resources;
pub mod sim;
pub mod state_machine;

pub use actuator::{ActuatorHandler, BinaryOutput, BlinkPattern, BlinkReport};
pub use client::{ClientInitError, EndpointInfo, ManagementClient, StorageHandle};
pub use config::{AgentConfig, ConfigManager, ConfigurationError};
pub use connectivity::{ConnectError, ConnectOutcome, ConnectivityManager, NetworkLink};
pub use context::{AgentContext, AgentProducer, AgentQueue, InboundOperation};
pub use coordinator::RegistrationCoordinator;
pub use dispatch::{DeferredQueue, DispatchExit, TaskProducer, Ticker};
pub use error::{AgentError, Result};
pub use registry::{
    DeliveryStatus, Methods, NotificationSink, RegistryError, ResourceHandle, ResourcePath,
    ResourceRegistry, ResourceValue,
};
pub use resources::{ReferenceResources, ResourceSet};
pub use state_machine::{RegistrationEvent, RegistrationState, RegistrationStateMachine};
