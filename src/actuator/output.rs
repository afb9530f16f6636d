use tracing::debug;

/// A digital output pin (LED, relay, ...)
pub trait BinaryOutput: Send {
    /// Invert the output, returning the new level
    fn toggle(&mut self) -> bool;

    fn is_on(&self) -> bool;
}

/// Output without hardware behind it; logs each edge.
#[derive(Debug, Clone, Default)]
pub struct VirtualOutput {
    name: String,
    on: bool,
    toggles: u64,
}

impl VirtualOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on: false,
            toggles: 0,
        }
    }

    pub fn toggles(&self) -> u64 {
        self.toggles
    }
}

impl BinaryOutput for VirtualOutput {
    fn toggle(&mut self) -> bool {
        self.on = !self.on;
        self.toggles += 1;
        debug!(output = %self.name, on = self.on, "💡 Output toggled");
        self.on
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
