use crate::client::{EndpointInfo, ManagementClient, StorageHandle};
use crate::clock::Sleeper;
use crate::config::AgentConfig;
use crate::connectivity::{BackoffPolicy, ConnectivityManager, NetworkLink};
use crate::context::{AgentContext, AgentProducer, AgentQueue};
use crate::dispatch::{DispatchExit, Ticker};
use crate::error::{AgentError, Result};
use crate::logging::log_error;
use crate::resources::ResourceSet;
use crate::state_machine::{RegistrationEvent, RegistrationState};
use std::convert::Infallible;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Halt reason posted when the registration acknowledgment never arrives
pub const REGISTRATION_TIMEOUT_REASON: &str = "registration_timeout";

/// Drives link bring-up, client initialization, resource declaration and
/// registration, then runs the dispatch loop.
pub struct RegistrationCoordinator<L, M> {
    config: AgentConfig,
    connectivity: ConnectivityManager<L>,
    client: M,
    resources: Box<dyn ResourceSet>,
    queue: AgentQueue,
    triggers: Vec<Ticker>,
}

impl<L: NetworkLink, M: ManagementClient> RegistrationCoordinator<L, M> {
    pub fn new(config: AgentConfig, link: L, client: M, resources: impl ResourceSet + 'static) -> Self {
        let connectivity =
            ConnectivityManager::new(link).with_backoff(BackoffPolicy::from_config(&config.connectivity));
        Self {
            config,
            connectivity,
            client,
            resources: Box::new(resources),
            queue: AgentQueue::new(AgentContext::new()),
            triggers: Vec::new(),
        }
    }

    /// Sleep implementation used between connection retries
    pub fn with_sleeper(self, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            connectivity: self.connectivity.with_sleeper(sleeper),
            ..self
        }
    }

    pub fn state(&self) -> RegistrationState {
        self.queue.context().registration.current_state()
    }

    pub fn context(&self) -> &AgentContext {
        self.queue.context()
    }

    pub fn producer(&self) -> AgentProducer {
        self.queue.producer()
    }

    pub fn queue_mut(&mut self) -> &mut AgentQueue {
        &mut self.queue
    }

    pub fn client(&self) -> &M {
        &self.client
    }

    pub fn link(&self) -> &L {
        self.connectivity.link()
    }

    /// Run the startup sequence up to `RegistrationPending`.
    ///
    /// Any failure moves the registration to `Failed` and is returned; the
    /// registration acknowledgment itself is only applied by the dispatch
    /// loop.
    pub fn start(&mut self) -> Result<()> {
        info!("🚀 Starting device agent");
        self.transition(RegistrationEvent::BeginConnect)?;

        let max_retries = self.config.connectivity.max_retries;
        match self.connectivity.connect(max_retries) {
            Ok(connected) => {
                info!(attempts = connected.attempts, "Connected to the network successfully");
            }
            Err(err) => return Err(self.abort("connect", err.into())),
        }
        self.connectivity.log_device_info();
        self.transition(RegistrationEvent::LinkEstablished)?;

        let storage = StorageHandle::new(self.config.storage.mount_point.as_str());
        if let Err(err) = self.client.init(&storage) {
            return Err(self.abort("client_init", err.into()));
        }
        let sink = self.client.notification_sink(self.queue.producer());
        self.queue.context_mut().registry.set_notification_sink(sink);

        if let Err(err) = self.resources.declare(&mut self.queue.context_mut().registry) {
            return Err(self.abort("declare_resources", err.into()));
        }
        self.transition(RegistrationEvent::ResourcesDeclared)?;

        let registry = &mut self.queue.context_mut().registry;
        registry.seal();
        let descriptors = registry.descriptors();

        let ack_producer = self.queue.producer();
        self.client.on_registered(Box::new(move |endpoint: EndpointInfo| {
            let posted = ack_producer.post(move |ctx: &mut AgentContext| acknowledge(ctx, endpoint));
            if posted.is_err() {
                warn!("Registration acknowledged after dispatch stopped");
            }
        }));

        self.transition(RegistrationEvent::RegistrationRequested)?;
        info!(resources = descriptors.len(), "Registering with the management service");
        self.client
            .register_and_connect(descriptors, self.queue.producer());

        self.triggers = self.resources.start_triggers(&self.queue.producer());
        Ok(())
    }

    /// Start, then dispatch deferred tasks until halted.
    ///
    /// Never returns on success. Startup failures, a registration timeout and
    /// an explicit halt come back as [`AgentError`].
    pub fn run(mut self) -> Result<Infallible> {
        self.start()?;

        if let Some(timeout) = self.config.registration.timeout() {
            self.arm_registration_timeout(timeout);
        }

        let exit = self.queue.dispatch_forever();
        self.triggers.clear();

        Err(match exit {
            DispatchExit::Halted { reason } if reason == REGISTRATION_TIMEOUT_REASON => {
                AgentError::RegistrationTimeout {
                    timeout_ms: self.config.registration.timeout_ms,
                }
            }
            DispatchExit::Halted { reason } => AgentError::DispatchStopped { reason },
            DispatchExit::Disconnected => AgentError::DispatchStopped {
                reason: "all producers disconnected".to_string(),
            },
        })
    }

    /// Fail the registration if it is still pending after `timeout`
    fn arm_registration_timeout(&self, timeout: Duration) {
        let producer = self.queue.producer();
        let spawned = thread::Builder::new()
            .name("registration-timeout".to_string())
            .spawn(move || {
                thread::sleep(timeout);
                let halt = producer.clone();
                let _ = producer.post(move |ctx: &mut AgentContext| {
                    if ctx.registration.current_state() != RegistrationState::RegistrationPending {
                        return;
                    }
                    let reason = format!("no acknowledgment within {}ms", timeout.as_millis());
                    log_error("coordinator", "register", &reason, None);
                    let _ = ctx
                        .registration
                        .transition(RegistrationEvent::fail_with_error(reason));
                    let _ = halt.request_halt(REGISTRATION_TIMEOUT_REASON);
                });
            });

        match spawned {
            Ok(_) => debug!(timeout_ms = timeout.as_millis() as u64, "Registration timeout armed"),
            Err(err) => warn!(error = %err, "Could not arm registration timeout"),
        }
    }

    fn transition(&mut self, event: RegistrationEvent) -> Result<RegistrationState> {
        Ok(self.queue.context_mut().registration.transition(event)?)
    }

    /// Record a startup failure and hand the error back
    fn abort(&mut self, operation: &str, err: AgentError) -> AgentError {
        let reason = err.to_string();
        log_error("coordinator", operation, &reason, None);
        if let Err(transition_err) = self.transition(RegistrationEvent::fail_with_error(reason)) {
            warn!(error = %transition_err, "Could not record startup failure");
        }
        err
    }
}

/// Apply a registration acknowledgment inside the dispatch loop
fn acknowledge(ctx: &mut AgentContext, endpoint: EndpointInfo) {
    match ctx
        .registration
        .transition(RegistrationEvent::RegistrationAcknowledged(endpoint.clone()))
    {
        Ok(_) => info!(endpoint = %endpoint, "Connected to management service. Endpoint Name: {}", endpoint),
        Err(err) => warn!(endpoint = %endpoint, error = %err, "Ignoring registration acknowledgment"),
    }
}
