use super::resource::{Methods, ResourcePath, ValueType};

/// Errors raised by the resource registry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Resource path already registered: {path}")]
    DuplicatePath { path: ResourcePath },

    #[error("Type mismatch on {path}: declared {expected}, got {actual}")]
    TypeMismatch {
        path: ResourcePath,
        expected: ValueType,
        actual: ValueType,
    },

    #[error("Unknown resource handle: {0}")]
    UnknownHandle(usize),

    #[error("Unknown resource path: {path}")]
    UnknownPath { path: String },

    #[error("Method {method} not allowed on {path} (allowed: {allowed})")]
    MethodNotAllowed {
        path: ResourcePath,
        method: Methods,
        allowed: Methods,
    },

    #[error("Registry sealed, declaration phase is over ({operation})")]
    Sealed { operation: String },

    #[error("Invalid resource path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
