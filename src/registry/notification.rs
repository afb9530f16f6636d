use super::resource::{ResourcePath, ResourceValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Outcome of the most recent change notification of an observable resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Scheduled, nothing reported yet
    Pending,
    /// Handed to the transport
    Sent,
    /// Acknowledged by the remote side
    Delivered,
    /// Transport gave up
    Failed,
    /// Notification could not be built
    BuildError,
    /// Resend queue full, notification dropped
    ResendQueueFull,
    /// Remote side started observing
    Subscribed,
    /// Remote side stopped observing
    Unsubscribed,
}

impl DeliveryStatus {
    /// Statuses that mean the notification will not reach the remote side
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::BuildError | Self::ResendQueueFull)
    }

    /// Statuses after which no further report is expected for this notification
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Pending | Self::Sent)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Sent => write!(f, "sent"),
            Self::Delivered => write!(f, "delivered"),
            Self::Failed => write!(f, "failed"),
            Self::BuildError => write!(f, "build_error"),
            Self::ResendQueueFull => write!(f, "resend_queue_full"),
            Self::Subscribed => write!(f, "subscribed"),
            Self::Unsubscribed => write!(f, "unsubscribed"),
        }
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "failed" => Ok(Self::Failed),
            "build_error" => Ok(Self::BuildError),
            "resend_queue_full" => Ok(Self::ResendQueueFull),
            "subscribed" => Ok(Self::Subscribed),
            "unsubscribed" => Ok(Self::Unsubscribed),
            _ => Err(format!("Invalid delivery status: {s}")),
        }
    }
}

/// Outbound side of observation: receives change notifications from the
/// registry. Fire-and-forget; delivery status comes back later through
/// [`ResourceRegistry::report_delivery`](super::ResourceRegistry::report_delivery).
pub trait NotificationSink: Send {
    fn schedule(&mut self, path: &ResourcePath, value: &ResourceValue);
}

/// Discards notifications. Used before a management client is attached.
#[derive(Debug, Default)]
pub struct NullNotificationSink;

impl NotificationSink for NullNotificationSink {
    fn schedule(&mut self, path: &ResourcePath, value: &ResourceValue) {
        debug!(path = %path, value = %value, "Notification discarded, no sink attached");
    }
}
