//! # Resource Registry
//!
//! Arena of resources addressed by [`ResourceHandle`], with a path index for
//! inbound remote operations.
//!
//! ## Usage
//!
//! ```rust
//! use device_agent::registry::{Methods, ResourceRegistry, ResourceValue};
//!
//! let mut registry = ResourceRegistry::new();
//! let button = registry.create("3200/0/5501", "button_count", 0i64).unwrap();
//! registry.set_methods(button, Methods::GET).unwrap();
//! registry.set_observable(button, true).unwrap();
//!
//! registry.set_value(button, 1i64).unwrap();
//! assert_eq!(registry.get_value(button).unwrap(), ResourceValue::Integer(1));
//! ```

use super::errors::{RegistryError, RegistryResult};
use super::notification::{DeliveryStatus, NotificationSink, NullNotificationSink};
use super::resource::{
    Methods, NotificationCallback, PostCallback, PutCallback, Resource, ResourceCallbacks,
    ResourceDescriptor, ResourceHandle, ResourcePath, ResourceValue,
};
use crate::logging::log_resource_operation;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// What happened to an inbound remote operation
#[derive(Debug, Clone, PartialEq)]
pub enum InboundOutcome {
    /// Operation applied and its callback (if any) invoked
    Applied,
    /// Operation accepted by the method mask but ignored
    Dropped { reason: String },
}

/// Registry-wide counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub resources: usize,
    pub observable: usize,
    pub notifications_scheduled: u64,
    pub failed_deliveries: u64,
    pub sealed: bool,
}

/// Owner of every addressable resource
pub struct ResourceRegistry {
    resources: Vec<Resource>,
    index: HashMap<ResourcePath, ResourceHandle>,
    sink: Box<dyn NotificationSink>,
    sealed: bool,
    failed_deliveries: u64,
}

impl ResourceRegistry {
    /// Create an empty registry that discards notifications
    pub fn new() -> Self {
        Self::with_sink(Box::new(NullNotificationSink))
    }

    /// Create an empty registry that forwards notifications to `sink`
    pub fn with_sink(sink: Box<dyn NotificationSink>) -> Self {
        Self {
            resources: Vec::new(),
            index: HashMap::new(),
            sink,
            sealed: false,
            failed_deliveries: 0,
        }
    }

    /// Replace the notification sink (done once the management client is up)
    pub fn set_notification_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sink = sink;
    }

    /// Register a new resource
    pub fn create(
        &mut self,
        path: &str,
        label: &str,
        initial_value: impl Into<ResourceValue>,
    ) -> RegistryResult<ResourceHandle> {
        let path: ResourcePath = path.parse()?;
        self.ensure_declaring("create")?;

        if self.index.contains_key(&path) {
            return Err(RegistryError::DuplicatePath { path });
        }

        let value = initial_value.into();
        let handle = ResourceHandle(self.resources.len());
        self.resources.push(Resource {
            path,
            label: label.to_string(),
            value_type: value.value_type(),
            value,
            methods: Methods::NONE,
            observable: false,
            callbacks: ResourceCallbacks::default(),
            notifications_scheduled: 0,
            last_delivery: None,
        });
        self.index.insert(path, handle);

        log_resource_operation("create", &path.to_string(), Some(label), "success", None);
        Ok(handle)
    }

    /// Set the allowed remote methods. Bits outside GET/PUT/POST are ignored.
    pub fn set_methods(&mut self, handle: ResourceHandle, methods: Methods) -> RegistryResult<()> {
        self.ensure_declaring("set_methods")?;
        let resource = self.resource_mut(handle)?;
        resource.methods = Methods::from_bits_truncate(methods.bits());
        debug!(path = %resource.path, methods = %resource.methods, "Methods set");
        Ok(())
    }

    pub fn set_observable(&mut self, handle: ResourceHandle, observable: bool) -> RegistryResult<()> {
        self.ensure_declaring("set_observable")?;
        let resource = self.resource_mut(handle)?;
        resource.observable = observable;
        debug!(path = %resource.path, observable = observable, "Observable set");
        Ok(())
    }

    pub fn get_value(&self, handle: ResourceHandle) -> RegistryResult<ResourceValue> {
        Ok(self.resource(handle)?.value.clone())
    }

    /// Store a new value. Observable resources schedule a change notification.
    pub fn set_value(
        &mut self,
        handle: ResourceHandle,
        value: impl Into<ResourceValue>,
    ) -> RegistryResult<()> {
        let value = value.into();
        let resource = self.resource_mut(handle)?;

        if value.value_type() != resource.value_type {
            return Err(RegistryError::TypeMismatch {
                path: resource.path,
                expected: resource.value_type,
                actual: value.value_type(),
            });
        }

        resource.value = value;
        debug!(path = %resource.path, value = %resource.value, "Value updated");

        if resource.observable {
            resource.notifications_scheduled += 1;
            resource.last_delivery = Some(DeliveryStatus::Pending);
            let path = resource.path;
            let value = resource.value.clone();
            self.sink.schedule(&path, &value);
        }

        Ok(())
    }

    /// Bind the PUT callback, replacing any previous one
    pub fn attach_put_callback<F>(&mut self, handle: ResourceHandle, callback: F) -> RegistryResult<()>
    where
        F: Fn(&ResourceRegistry, ResourceHandle, &ResourceValue) + Send + Sync + 'static,
    {
        let callback: PutCallback = std::sync::Arc::new(callback);
        self.resource_mut(handle)?.callbacks.on_put = Some(callback);
        Ok(())
    }

    /// Bind the POST callback, replacing any previous one
    pub fn attach_post_callback<F>(&mut self, handle: ResourceHandle, callback: F) -> RegistryResult<()>
    where
        F: Fn(&ResourceRegistry, ResourceHandle, &[u8]) + Send + Sync + 'static,
    {
        let callback: PostCallback = std::sync::Arc::new(callback);
        self.resource_mut(handle)?.callbacks.on_post = Some(callback);
        Ok(())
    }

    /// Bind the notification delivery callback, replacing any previous one
    pub fn attach_notification_callback<F>(
        &mut self,
        handle: ResourceHandle,
        callback: F,
    ) -> RegistryResult<()>
    where
        F: Fn(ResourceHandle, DeliveryStatus) + Send + Sync + 'static,
    {
        let callback: NotificationCallback = std::sync::Arc::new(callback);
        self.resource_mut(handle)?.callbacks.on_notification = Some(callback);
        Ok(())
    }

    /// End the declaration phase. Methods, observability and the resource set
    /// are frozen from here on.
    pub fn seal(&mut self) {
        if !self.sealed {
            self.sealed = true;
            info!(resources = self.resources.len(), "Resource declaration sealed");
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Serve an inbound GET
    pub fn handle_remote_get(&self, path: &str) -> RegistryResult<ResourceValue> {
        let handle = self.lookup(path)?;
        let resource = self.resource(handle)?;
        Self::check_method(resource, Methods::GET)?;
        Ok(resource.value.clone())
    }

    /// Apply an inbound PUT. Without a bound PUT callback the write is
    /// dropped and the stored value stays as it was.
    pub fn handle_remote_put(
        &mut self,
        path: &str,
        value: impl Into<ResourceValue>,
    ) -> RegistryResult<InboundOutcome> {
        let handle = self.lookup(path)?;
        let resource = self.resource(handle)?;
        Self::check_method(resource, Methods::PUT)?;

        let Some(callback) = resource.callbacks.on_put.clone() else {
            debug!(path = %path, "PUT dropped, no callback bound");
            return Ok(InboundOutcome::Dropped {
                reason: "no put callback bound".to_string(),
            });
        };

        let value = value.into();
        self.set_value(handle, value.clone())?;
        log_resource_operation("put", path, None, "applied", Some(&value.to_string()));
        callback(&*self, handle, &value);
        Ok(InboundOutcome::Applied)
    }

    /// Apply an inbound POST by invoking the bound POST callback
    pub fn handle_remote_post(&self, path: &str, payload: &[u8]) -> RegistryResult<InboundOutcome> {
        let handle = self.lookup(path)?;
        let resource = self.resource(handle)?;
        Self::check_method(resource, Methods::POST)?;

        let Some(callback) = resource.callbacks.on_post.clone() else {
            debug!(path = %path, "POST dropped, no callback bound");
            return Ok(InboundOutcome::Dropped {
                reason: "no post callback bound".to_string(),
            });
        };

        log_resource_operation("post", path, None, "applied", None);
        callback(self, handle, payload);
        Ok(InboundOutcome::Applied)
    }

    /// Record a delivery report for the latest notification of `path` and
    /// hand it to the notification callback. Failures are logged only.
    pub fn report_delivery(&mut self, path: &str, status: DeliveryStatus) -> RegistryResult<()> {
        let handle = self.lookup(path)?;
        let resource = self.resource_mut(handle)?;
        resource.last_delivery = Some(status);
        let callback = resource.callbacks.on_notification.clone();

        if status.is_failure() {
            self.failed_deliveries += 1;
            warn!(path = %path, status = %status, "Notification delivery failed");
        } else {
            debug!(path = %path, status = %status, "Notification delivery status");
        }

        if let Some(callback) = callback {
            callback(handle, status);
        }
        Ok(())
    }

    /// Resolve a textual path to its handle
    pub fn lookup(&self, path: &str) -> RegistryResult<ResourceHandle> {
        path.parse::<ResourcePath>()
            .ok()
            .and_then(|parsed| self.index.get(&parsed).copied())
            .ok_or_else(|| RegistryError::UnknownPath {
                path: path.to_string(),
            })
    }

    pub fn path(&self, handle: ResourceHandle) -> RegistryResult<ResourcePath> {
        Ok(self.resource(handle)?.path)
    }

    pub fn label(&self, handle: ResourceHandle) -> RegistryResult<&str> {
        Ok(&self.resource(handle)?.label)
    }

    pub fn methods(&self, handle: ResourceHandle) -> RegistryResult<Methods> {
        Ok(self.resource(handle)?.methods)
    }

    pub fn is_observable(&self, handle: ResourceHandle) -> RegistryResult<bool> {
        Ok(self.resource(handle)?.observable)
    }

    pub fn notifications_scheduled(&self, handle: ResourceHandle) -> RegistryResult<u64> {
        Ok(self.resource(handle)?.notifications_scheduled)
    }

    pub fn last_delivery(&self, handle: ResourceHandle) -> RegistryResult<Option<DeliveryStatus>> {
        Ok(self.resource(handle)?.last_delivery)
    }

    pub fn descriptor(&self, handle: ResourceHandle) -> RegistryResult<ResourceDescriptor> {
        let resource = self.resource(handle)?;
        Ok(ResourceDescriptor {
            path: resource.path,
            label: resource.label.clone(),
            value_type: resource.value_type,
            methods: resource.methods,
            observable: resource.observable,
        })
    }

    /// Declarations of every resource, in creation order
    pub fn descriptors(&self) -> Vec<ResourceDescriptor> {
        (0..self.resources.len())
            .filter_map(|index| self.descriptor(ResourceHandle(index)).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            resources: self.resources.len(),
            observable: self.resources.iter().filter(|r| r.observable).count(),
            notifications_scheduled: self
                .resources
                .iter()
                .map(|r| r.notifications_scheduled)
                .sum(),
            failed_deliveries: self.failed_deliveries,
            sealed: self.sealed,
        }
    }

    fn resource(&self, handle: ResourceHandle) -> RegistryResult<&Resource> {
        self.resources
            .get(handle.0)
            .ok_or(RegistryError::UnknownHandle(handle.0))
    }

    fn resource_mut(&mut self, handle: ResourceHandle) -> RegistryResult<&mut Resource> {
        self.resources
            .get_mut(handle.0)
            .ok_or(RegistryError::UnknownHandle(handle.0))
    }

    fn ensure_declaring(&self, operation: &str) -> RegistryResult<()> {
        if self.sealed {
            return Err(RegistryError::Sealed {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn check_method(resource: &Resource, method: Methods) -> RegistryResult<()> {
        if resource.methods.contains(method) {
            Ok(())
        } else {
            Err(RegistryError::MethodNotAllowed {
                path: resource.path,
                method,
                allowed: resource.methods,
            })
        }
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("resources", &self.resources)
            .field("sealed", &self.sealed)
            .finish()
    }
}
