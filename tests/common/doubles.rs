//! Test doubles for the agent's collaborators

use device_agent::actuator::BinaryOutput;
use device_agent::client::{ClientInitError, EndpointInfo, ManagementClient, RegisteredCallback, StorageHandle};
use device_agent::clock::Sleeper;
use device_agent::connectivity::{ConnectOutcome, NetworkLink};
use device_agent::constants::network::NO_CONNECTION_CODE;
use device_agent::context::{post_inbound, AgentProducer, InboundOperation};
use device_agent::registry::{NotificationSink, ResourceDescriptor, ResourcePath, ResourceValue};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Link that replays a fixed list of outcomes. Once the script runs out every
/// attempt fails transiently.
#[derive(Debug, Default)]
pub struct ScriptedLink {
    outcomes: VecDeque<ConnectOutcome>,
    connected: bool,
    attempts: u32,
    device_info: Option<String>,
}

impl ScriptedLink {
    pub fn new(outcomes: Vec<ConnectOutcome>) -> Self {
        Self {
            outcomes: outcomes.into(),
            ..Self::default()
        }
    }

    /// Fail transiently `failures` times, then connect
    pub fn failing_times(failures: usize) -> Self {
        let mut outcomes = vec![ConnectOutcome::TransientFailure(NO_CONNECTION_CODE); failures];
        outcomes.push(ConnectOutcome::Connected);
        Self::new(outcomes)
    }

    pub fn already_connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn with_device_info(mut self, info: &str) -> Self {
        self.device_info = Some(info.to_string());
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl NetworkLink for ScriptedLink {
    fn connect(&mut self) -> ConnectOutcome {
        self.attempts += 1;
        let outcome = self
            .outcomes
            .pop_front()
            .unwrap_or(ConnectOutcome::TransientFailure(NO_CONNECTION_CODE));
        if outcome.is_success() {
            self.connected = true;
        }
        outcome
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn device_info(&self) -> Option<String> {
        self.device_info.clone()
    }
}

/// Records requested sleeps instead of blocking
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}

/// Output that remembers every level it was driven to
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    levels: Arc<Mutex<Vec<bool>>>,
    on: Arc<Mutex<bool>>,
}

impl RecordingOutput {
    pub fn new(initially_on: bool) -> Self {
        Self {
            levels: Arc::default(),
            on: Arc::new(Mutex::new(initially_on)),
        }
    }

    pub fn levels(&self) -> Vec<bool> {
        self.levels.lock().clone()
    }

    pub fn toggles(&self) -> usize {
        self.levels.lock().len()
    }
}

impl BinaryOutput for RecordingOutput {
    fn toggle(&mut self) -> bool {
        let mut on = self.on.lock();
        *on = !*on;
        self.levels.lock().push(*on);
        *on
    }

    fn is_on(&self) -> bool {
        *self.on.lock()
    }
}

#[derive(Default)]
struct ClientState {
    init_calls: u32,
    init_error: Option<ClientInitError>,
    storage: Option<StorageHandle>,
    callback: Option<RegisteredCallback>,
    producer: Option<AgentProducer>,
    announced: Vec<ResourceDescriptor>,
    notifications: Vec<(String, ResourceValue)>,
}

/// Management client double. Clones share state, so a test keeps one clone
/// while the coordinator owns the other.
#[derive(Clone, Default)]
pub struct RecordingClient {
    state: Arc<Mutex<ClientState>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_init(code: i32) -> Self {
        let client = Self::default();
        client.state.lock().init_error = Some(ClientInitError::new(code, "storage unavailable"));
        client
    }

    pub fn init_calls(&self) -> u32 {
        self.state.lock().init_calls
    }

    pub fn storage(&self) -> Option<StorageHandle> {
        self.state.lock().storage.clone()
    }

    pub fn announced(&self) -> Vec<ResourceDescriptor> {
        self.state.lock().announced.clone()
    }

    pub fn registration_requested(&self) -> bool {
        self.state.lock().producer.is_some()
    }

    pub fn notifications(&self) -> Vec<(String, ResourceValue)> {
        self.state.lock().notifications.clone()
    }

    /// Fire the registration acknowledgment as the service would
    pub fn acknowledge(&self, endpoint: &str) -> bool {
        let state = self.state.lock();
        match &state.callback {
            Some(callback) => {
                callback(EndpointInfo::new(endpoint));
                true
            }
            None => false,
        }
    }

    /// Deliver an inbound remote operation
    pub fn inject(&self, operation: InboundOperation) -> bool {
        let state = self.state.lock();
        match &state.producer {
            Some(producer) => post_inbound(producer, operation),
            None => false,
        }
    }
}

impl ManagementClient for RecordingClient {
    fn init(&mut self, storage: &StorageHandle) -> Result<(), ClientInitError> {
        let mut state = self.state.lock();
        state.init_calls += 1;
        state.storage = Some(storage.clone());
        match &state.init_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn notification_sink(&self, _producer: AgentProducer) -> Box<dyn NotificationSink> {
        Box::new(RecordingSink {
            state: Arc::clone(&self.state),
        })
    }

    fn on_registered(&mut self, callback: RegisteredCallback) {
        self.state.lock().callback = Some(callback);
    }

    fn register_and_connect(&mut self, resources: Vec<ResourceDescriptor>, producer: AgentProducer) {
        let mut state = self.state.lock();
        state.announced = resources;
        state.producer = Some(producer);
    }
}

struct RecordingSink {
    state: Arc<Mutex<ClientState>>,
}

impl NotificationSink for RecordingSink {
    fn schedule(&mut self, path: &ResourcePath, value: &ResourceValue) {
        self.state
            .lock()
            .notifications
            .push((path.to_string(), value.clone()));
    }
}

/// In-memory tracing output, for asserting on emitted log lines
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Run `f` with a plain-text subscriber writing into this buffer
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let logs = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || logs.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_owned)
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
