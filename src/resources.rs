//! # Reference Resource Set
//!
//! The three resources every device exposes out of the box: a simulated
//! button press counter, a blink pattern and an action that plays it.
//!
//! | path          | label           | type    | methods | observable |
//! |---------------|-----------------|---------|---------|------------|
//! | `3200/0/5501` | `button_count`  | integer | GET     | yes        |
//! | `3201/0/5853` | `blink_pattern` | string  | GET+PUT | no         |
//! | `3201/0/5850` | `blink_action`  | string  | POST    | no         |

use crate::actuator::ActuatorHandler;
use crate::constants::{labels, paths};
use crate::context::{AgentContext, AgentProducer};
use crate::dispatch::Ticker;
use crate::registry::{Methods, RegistryResult, ResourceRegistry, ResourceValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A set of resources the coordinator declares during startup
pub trait ResourceSet {
    /// Create the resources and bind their callbacks.
    fn declare(&self, registry: &mut ResourceRegistry) -> RegistryResult<()>;

    /// Start periodic value sources once registration has been requested.
    /// The returned tickers stop when dropped.
    fn start_triggers(&self, _producer: &AgentProducer) -> Vec<Ticker> {
        Vec::new()
    }
}

pub struct ReferenceResources {
    actuator: Arc<ActuatorHandler>,
    initial_pattern: String,
    button_interval: Option<Duration>,
}

impl ReferenceResources {
    pub fn new(actuator: Arc<ActuatorHandler>, initial_pattern: impl Into<String>) -> Self {
        Self {
            actuator,
            initial_pattern: initial_pattern.into(),
            button_interval: None,
        }
    }

    /// Simulate a button press every `interval`
    pub fn with_button_interval(mut self, interval: Option<Duration>) -> Self {
        self.button_interval = interval;
        self
    }

    pub fn actuator(&self) -> &Arc<ActuatorHandler> {
        &self.actuator
    }
}

impl ResourceSet for ReferenceResources {
    fn declare(&self, registry: &mut ResourceRegistry) -> RegistryResult<()> {
        let button = registry.create(paths::BUTTON_COUNT, labels::BUTTON_COUNT, 0i64)?;
        registry.set_methods(button, Methods::GET)?;
        registry.set_observable(button, true)?;
        registry.attach_notification_callback(button, |_, status| {
            info!(status = %status, "Button notification");
        })?;

        let pattern = registry.create(
            paths::BLINK_PATTERN,
            labels::BLINK_PATTERN,
            self.initial_pattern.as_str(),
        )?;
        registry.set_methods(pattern, Methods::GET | Methods::PUT)?;
        registry.attach_put_callback(pattern, |registry, handle, value| {
            let label = registry.label(handle).unwrap_or(labels::BLINK_PATTERN);
            info!(label = %label, value = %value, "PUT received, new value");
        })?;

        let action = registry.create(paths::BLINK_ACTION, labels::BLINK_ACTION, "")?;
        registry.set_methods(action, Methods::POST)?;
        let actuator = Arc::clone(&self.actuator);
        registry.attach_post_callback(action, move |registry, _, _payload| {
            match registry.get_value(pattern) {
                Ok(ResourceValue::String(raw)) => {
                    info!(pattern = %raw, "POST received, blinking");
                    actuator.play(&raw);
                }
                Ok(other) => warn!(value = %other, "Blink pattern is not a string"),
                Err(err) => warn!(error = %err, "Blink pattern unavailable"),
            }
        })?;

        Ok(())
    }

    fn start_triggers(&self, producer: &AgentProducer) -> Vec<Ticker> {
        let Some(interval) = self.button_interval else {
            return Vec::new();
        };

        match Ticker::spawn("button-press", interval, producer.clone(), |ctx: &mut AgentContext| {
            if let Err(err) = simulate_button_press(ctx) {
                warn!(error = %err, "Simulated button press failed");
            }
        }) {
            Ok(ticker) => vec![ticker],
            Err(err) => {
                warn!(error = %err, "Could not start button ticker");
                Vec::new()
            }
        }
    }
}

/// Increment the button counter. Returns the new count.
pub fn simulate_button_press(ctx: &mut AgentContext) -> RegistryResult<i64> {
    let handle = ctx.registry.lookup(paths::BUTTON_COUNT)?;
    let count = ctx.registry.get_value(handle)?.as_integer().unwrap_or(0) + 1;
    ctx.registry.set_value(handle, count)?;
    info!(count = count, "Simulated button clicked {} times", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::VirtualOutput;
    use crate::registry::InboundOutcome;

    fn resources() -> ReferenceResources {
        let actuator = Arc::new(ActuatorHandler::new(VirtualOutput::new("led")));
        ReferenceResources::new(actuator, "0:0:0")
    }

    #[test]
    fn test_declares_reference_resources() {
        let mut registry = ResourceRegistry::new();
        resources().declare(&mut registry).unwrap();

        assert_eq!(registry.len(), 3);
        let button = registry.lookup(paths::BUTTON_COUNT).unwrap();
        assert!(registry.is_observable(button).unwrap());
        assert_eq!(registry.methods(button).unwrap(), Methods::GET);

        let pattern = registry.lookup(paths::BLINK_PATTERN).unwrap();
        assert_eq!(registry.methods(pattern).unwrap(), Methods::GET | Methods::PUT);
        assert_eq!(
            registry.get_value(pattern).unwrap(),
            ResourceValue::from("0:0:0")
        );
    }

    #[test]
    fn test_post_plays_current_pattern() {
        let set = resources();
        let mut registry = ResourceRegistry::new();
        set.declare(&mut registry).unwrap();
        registry.seal();

        let initial = set.actuator().is_on();
        let outcome = registry.handle_remote_post(paths::BLINK_ACTION, b"").unwrap();
        assert_eq!(outcome, InboundOutcome::Applied);
        // Three steps flip the output
        assert_ne!(set.actuator().is_on(), initial);
    }

    #[test]
    fn test_button_press_counts_up() {
        let mut ctx = AgentContext::new();
        resources().declare(&mut ctx.registry).unwrap();

        for expected in 1..=3 {
            assert_eq!(simulate_button_press(&mut ctx).unwrap(), expected);
        }
        let button = ctx.registry.lookup(paths::BUTTON_COUNT).unwrap();
        assert_eq!(ctx.registry.notifications_scheduled(button).unwrap(), 3);
    }
}
