//! # Agent Constants
//!
//! Reference resource paths and defaults shared by the coordinator, the
//! simulated collaborators and the binary.

/// Resource paths of the reference resource set
pub mod paths {
    /// Button press counter (integer, GET, observable)
    pub const BUTTON_COUNT: &str = "3200/0/5501";
    /// Blink pattern (string, GET + PUT)
    pub const BLINK_PATTERN: &str = "3201/0/5853";
    /// Blink action (POST only)
    pub const BLINK_ACTION: &str = "3201/0/5850";
}

/// Human labels of the reference resource set
pub mod labels {
    pub const BUTTON_COUNT: &str = "button_count";
    pub const BLINK_PATTERN: &str = "blink_pattern";
    pub const BLINK_ACTION: &str = "blink_action";
}

/// Connection retry and status codes
pub mod network {
    /// Default number of retries after the first failed attempt
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Authentication rejected by the bearer
    pub const AUTH_FAILURE_CODE: i32 = -3018;
    /// No connection could be established
    pub const NO_CONNECTION_CODE: i32 = -3004;
    /// Underlying device reported an error
    pub const DEVICE_ERROR_CODE: i32 = -3012;
}

/// Default blink pattern stored in the pattern resource at startup
pub const DEFAULT_BLINK_PATTERN: &str = "500:500:500:500:500:500:500:500";

/// Default storage mount name handed to the management client
pub const DEFAULT_MOUNT_POINT: &str = "sd";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DEVICE_AGENT";
