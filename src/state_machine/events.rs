use crate::client::EndpointInfo;
use serde::{Deserialize, Serialize};

/// Events that drive registration state transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RegistrationEvent {
    /// Start bringing the link up
    BeginConnect,
    /// Link reported connected
    LinkEstablished,
    /// Management client initialized and resources created
    ResourcesDeclared,
    /// `register_and_connect` issued
    RegistrationRequested,
    /// Remote side acknowledged registration
    RegistrationAcknowledged(EndpointInfo),
    /// Startup step failed
    Fail(String),
}

impl RegistrationEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::BeginConnect => "begin_connect",
            Self::LinkEstablished => "link_established",
            Self::ResourcesDeclared => "resources_declared",
            Self::RegistrationRequested => "registration_requested",
            Self::RegistrationAcknowledged(_) => "registration_acknowledged",
            Self::Fail(_) => "fail",
        }
    }

    /// Extract error message if this is a failure event
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Fail(msg) => Some(msg),
            _ => None,
        }
    }

    /// Create a failure event with the given error message
    pub fn fail_with_error(error: impl Into<String>) -> Self {
        Self::Fail(error.into())
    }
}
