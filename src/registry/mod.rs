//! # Resource Registry
//!
//! Owns every addressable resource the agent exposes to the management
//! service.
//!
//! ## Overview
//!
//! Resources are created once while the coordinator declares them, then live
//! until teardown. Callers hold a [`ResourceHandle`] (an index into the
//! registry's arena) instead of a pointer, and the registry stays the sole
//! owner of values and callbacks.
//!
//! ## Architecture
//!
//! ```text
//! ResourceRegistry
//! ├── Resource arena          (path, label, typed value, methods, observable)
//! ├── Path index              (ResourcePath → ResourceHandle)
//! ├── Callbacks               (on_put, on_post, on_notification)
//! └── NotificationSink        (change notifications toward the remote side)
//! ```
//!
//! The registry is only ever reached through the dispatch context, so it is
//! single-writer by construction and carries no locks.

pub mod errors;
pub mod notification;
pub mod resource;
pub mod resource_registry;

pub use errors::{RegistryError, RegistryResult};
pub use notification::{DeliveryStatus, NotificationSink, NullNotificationSink};
pub use resource::{
    Methods, NotificationCallback, PostCallback, PutCallback, ResourceDescriptor, ResourceHandle,
    ResourcePath, ResourceValue, ValueType,
};
pub use resource_registry::{InboundOutcome, RegistryStats, ResourceRegistry};
