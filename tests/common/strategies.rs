use device_agent::connectivity::ConnectOutcome;
use proptest::prelude::*;

/// Strategy for blink delays in milliseconds
pub fn delay_ms_strategy() -> impl Strategy<Value = u64> {
    0u64..5_000
}

/// Strategy for well-formed `d0:d1:...` patterns together with their delays
pub fn blink_pattern_strategy() -> impl Strategy<Value = (String, Vec<u64>)> {
    prop::collection::vec(delay_ms_strategy(), 1..16).prop_map(|delays| {
        let raw = delays
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(":");
        (raw, delays)
    })
}

/// Strategy for a failed, non-authentication connection attempt
pub fn retryable_outcome_strategy() -> impl Strategy<Value = ConnectOutcome> {
    prop_oneof![
        (-3100i32..-3000).prop_map(ConnectOutcome::TransientFailure),
        (-3100i32..-3000).prop_map(ConnectOutcome::FatalFailure),
    ]
}

/// Strategy for valid `object/instance/resource` paths
pub fn resource_path_strategy() -> impl Strategy<Value = (u16, u16, u16)> {
    (any::<u16>(), any::<u16>(), any::<u16>())
}

/// Strategy for human resource labels
pub fn label_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,31}"
}
