use super::errors::RegistryError;
use super::notification::DeliveryStatus;
use super::resource_registry::ResourceRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;
use std::sync::Arc;

/// Stable index of a resource inside its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(pub(crate) usize);

impl ResourceHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hierarchical `object/instance/resource` identifier, e.g. `3200/0/5501`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourcePath {
    pub object_id: u16,
    pub instance_id: u16,
    pub resource_id: u16,
}

impl ResourcePath {
    pub const fn new(object_id: u16, instance_id: u16, resource_id: u16) -> Self {
        Self {
            object_id,
            instance_id,
            resource_id,
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.object_id, self.instance_id, self.resource_id
        )
    }
}

impl FromStr for ResourcePath {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| RegistryError::InvalidPath {
            path: s.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = s.trim_matches('/').split('/').collect();
        if segments.len() != 3 {
            return Err(invalid("expected object/instance/resource"));
        }

        let mut ids = [0u16; 3];
        for (slot, segment) in ids.iter_mut().zip(&segments) {
            *slot = segment
                .parse()
                .map_err(|_| invalid("segments must be integers in 0..=65535"))?;
        }

        Ok(Self::new(ids[0], ids[1], ids[2]))
    }
}

impl TryFrom<String> for ResourcePath {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourcePath> for String {
    fn from(path: ResourcePath) -> Self {
        path.to_string()
    }
}

/// Declared type of a resource value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Integer,
    Float,
    String,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
        }
    }
}

/// Current value of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl ResourceValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ResourceValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ResourceValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ResourceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ResourceValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Allowed remote operations on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Methods(u8);

impl Methods {
    pub const NONE: Methods = Methods(0);
    pub const GET: Methods = Methods(0x01);
    pub const PUT: Methods = Methods(0x02);
    pub const POST: Methods = Methods(0x04);
    const ALL_BITS: u8 = 0x07;

    /// Build a mask from raw bits, dropping anything outside GET/PUT/POST
    pub fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, other: Methods) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Methods {
    type Output = Methods;

    fn bitor(self, rhs: Self) -> Self::Output {
        Methods(self.0 | rhs.0)
    }
}

impl BitOrAssign for Methods {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }
        let names: Vec<&str> = [(Self::GET, "GET"), (Self::PUT, "PUT"), (Self::POST, "POST")]
            .iter()
            .filter(|(method, _)| self.contains(*method))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join("|"))
    }
}

/// Invoked after an inbound PUT has been applied
pub type PutCallback = Arc<dyn Fn(&ResourceRegistry, ResourceHandle, &ResourceValue) + Send + Sync>;

/// Invoked for an inbound POST with its body
pub type PostCallback = Arc<dyn Fn(&ResourceRegistry, ResourceHandle, &[u8]) + Send + Sync>;

/// Invoked when the transport reports the delivery status of a notification
pub type NotificationCallback = Arc<dyn Fn(ResourceHandle, DeliveryStatus) + Send + Sync>;

#[derive(Default, Clone)]
pub(crate) struct ResourceCallbacks {
    pub(crate) on_put: Option<PutCallback>,
    pub(crate) on_post: Option<PostCallback>,
    pub(crate) on_notification: Option<NotificationCallback>,
}

impl fmt::Debug for ResourceCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCallbacks")
            .field("on_put", &self.on_put.is_some())
            .field("on_post", &self.on_post.is_some())
            .field("on_notification", &self.on_notification.is_some())
            .finish()
    }
}

/// A single registered resource
#[derive(Debug)]
pub(crate) struct Resource {
    pub(crate) path: ResourcePath,
    pub(crate) label: String,
    pub(crate) value: ResourceValue,
    pub(crate) value_type: ValueType,
    pub(crate) methods: Methods,
    pub(crate) observable: bool,
    pub(crate) callbacks: ResourceCallbacks,
    pub(crate) notifications_scheduled: u64,
    pub(crate) last_delivery: Option<DeliveryStatus>,
}

/// Declaration of a resource as announced to the management client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub path: ResourcePath,
    pub label: String,
    pub value_type: ValueType,
    pub methods: Methods,
    pub observable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parsing() {
        let path: ResourcePath = "3200/0/5501".parse().unwrap();
        assert_eq!(path, ResourcePath::new(3200, 0, 5501));
        assert_eq!(path.to_string(), "3200/0/5501");
        assert_eq!("/3201/0/5853".parse::<ResourcePath>().unwrap().object_id, 3201);
    }

    #[test]
    fn test_invalid_paths() {
        for bad in ["", "3200/0", "3200/0/5501/1", "a/b/c", "3200/-1/5", "70000/0/1"] {
            assert!(
                matches!(bad.parse::<ResourcePath>(), Err(RegistryError::InvalidPath { .. })),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_methods_mask() {
        let mask = Methods::GET | Methods::PUT;
        assert!(mask.contains(Methods::GET));
        assert!(mask.contains(Methods::PUT));
        assert!(!mask.contains(Methods::POST));
        assert_eq!(mask.to_string(), "GET|PUT");
        assert_eq!(Methods::from_bits_truncate(0xFF).bits(), 0x07);
        assert_eq!(Methods::NONE.to_string(), "NONE");
    }

    #[test]
    fn test_value_types() {
        assert_eq!(ResourceValue::from(5i64).value_type(), ValueType::Integer);
        assert_eq!(ResourceValue::from(0.5f64).value_type(), ValueType::Float);
        assert_eq!(ResourceValue::from("500").value_type(), ValueType::String);
        assert_eq!(ResourceValue::from("500").as_str(), Some("500"));
        assert_eq!(ResourceValue::from(7i64).as_integer(), Some(7));
    }

    #[test]
    fn test_path_serde() {
        let json = serde_json::to_string(&ResourcePath::new(3201, 0, 5850)).unwrap();
        assert_eq!(json, "\"3201/0/5850\"");
        let parsed: ResourcePath = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.resource_id, 5850);
    }
}
