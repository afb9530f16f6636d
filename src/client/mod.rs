//! # Management Client Interface
//!
//! The remote device-management protocol client (security, transport,
//! LwM2M encoding) lives outside this crate. The agent talks to it through
//! [`ManagementClient`] and receives its asynchronous events only as deferred
//! tasks posted through an [`AgentProducer`].

use crate::context::AgentProducer;
use crate::registry::{NotificationSink, ResourceDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity assigned by the management service on registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    /// Name under which the device shows up in the service portal
    pub internal_endpoint_name: String,
    pub endpoint_name: Option<String>,
    pub account_id: Option<String>,
}

impl EndpointInfo {
    pub fn new(internal_endpoint_name: impl Into<String>) -> Self {
        Self {
            internal_endpoint_name: internal_endpoint_name.into(),
            endpoint_name: None,
            account_id: None,
        }
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

impl fmt::Display for EndpointInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.internal_endpoint_name)
    }
}

/// Opaque storage mount handed to the client for credentials and state.
/// The agent never reads or writes through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageHandle {
    pub mount_point: String,
}

impl StorageHandle {
    pub fn new(mount_point: impl Into<String>) -> Self {
        Self {
            mount_point: mount_point.into(),
        }
    }
}

/// Client initialization failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Management client init failed with status {code}: {reason}")]
pub struct ClientInitError {
    pub code: i32,
    pub reason: String,
}

impl ClientInitError {
    pub fn new(code: i32, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// Invoked by the client once the service acknowledges registration. May be
/// called from any thread.
pub type RegisteredCallback = Box<dyn Fn(EndpointInfo) + Send + Sync>;

/// Remote device-management client
pub trait ManagementClient {
    /// Initialize the client against its storage.
    fn init(&mut self, storage: &StorageHandle) -> Result<(), ClientInitError>;

    /// Sink for change notifications of observable resources. Delivery
    /// reports go back through `producer`.
    fn notification_sink(&self, producer: AgentProducer) -> Box<dyn NotificationSink>;

    /// Register the callback fired on registration acknowledgment.
    fn on_registered(&mut self, callback: RegisteredCallback);

    /// Announce `resources` and start registering. Inbound remote operations
    /// are posted through `producer`.
    fn register_and_connect(&mut self, resources: Vec<ResourceDescriptor>, producer: AgentProducer);
}

impl<M: ManagementClient + ?Sized> ManagementClient for Box<M> {
    fn init(&mut self, storage: &StorageHandle) -> Result<(), ClientInitError> {
        (**self).init(storage)
    }

    fn notification_sink(&self, producer: AgentProducer) -> Box<dyn NotificationSink> {
        (**self).notification_sink(producer)
    }

    fn on_registered(&mut self, callback: RegisteredCallback) {
        (**self).on_registered(callback)
    }

    fn register_and_connect(&mut self, resources: Vec<ResourceDescriptor>, producer: AgentProducer) {
        (**self).register_and_connect(resources, producer)
    }
}
