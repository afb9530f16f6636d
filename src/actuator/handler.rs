use super::output::BinaryOutput;
use super::pattern::BlinkPattern;
use crate::clock::{Sleeper, ThreadSleeper};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Result of playing one pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlinkReport {
    pub toggles: usize,
    pub total_delay: Duration,
    pub initial_on: bool,
    pub final_on: bool,
}

/// Drives a binary output through blink patterns.
///
/// Shared between callbacks via `Arc`; the output sits behind a mutex so the
/// handler can be called through `&self`.
pub struct ActuatorHandler {
    output: Mutex<Box<dyn BinaryOutput>>,
    sleeper: Arc<dyn Sleeper>,
}

impl ActuatorHandler {
    pub fn new(output: impl BinaryOutput + 'static) -> Self {
        Self::with_sleeper(output, Arc::new(ThreadSleeper))
    }

    pub fn with_sleeper(output: impl BinaryOutput + 'static, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            output: Mutex::new(Box::new(output)),
            sleeper,
        }
    }

    pub fn is_on(&self) -> bool {
        self.output.lock().is_on()
    }

    /// Parse and play a raw `d0:d1:...` string
    pub fn play(&self, raw: &str) -> BlinkReport {
        self.run(&BlinkPattern::parse(raw))
    }

    /// Wait, toggle, repeat for every delay of the pattern. The output is left
    /// wherever the last toggle put it.
    pub fn run(&self, pattern: &BlinkPattern) -> BlinkReport {
        let mut output = self.output.lock();
        let initial_on = output.is_on();
        let mut toggles = 0;

        for delay in pattern.delays() {
            self.sleeper.sleep(delay);
            output.toggle();
            toggles += 1;
        }

        let report = BlinkReport {
            toggles,
            total_delay: pattern.total_duration(),
            initial_on,
            final_on: output.is_on(),
        };

        info!(
            pattern = %pattern,
            toggles = report.toggles,
            total_ms = report.total_delay.as_millis() as u64,
            final_on = report.final_on,
            "Blink pattern finished"
        );
        report
    }
}

impl std::fmt::Debug for ActuatorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorHandler")
            .field("on", &self.is_on())
            .finish()
    }
}
