use crate::client::{ClientInitError, EndpointInfo, ManagementClient, RegisteredCallback, StorageHandle};
use crate::config::SimulationConfig;
use crate::constants::network::DEVICE_ERROR_CODE;
use crate::context::{post_inbound, AgentProducer, InboundOperation};
use crate::registry::{DeliveryStatus, NotificationSink, ResourceDescriptor, ResourcePath, ResourceValue};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Management service stand-in: acknowledges registration after a delay and
/// reports every notification as delivered.
pub struct SimulatedClient {
    endpoint_name: String,
    registration_delay: Duration,
    fail_init: bool,
    initialized: bool,
    callback: Option<RegisteredCallback>,
    producer: Option<AgentProducer>,
    announced: Vec<ResourceDescriptor>,
}

impl SimulatedClient {
    pub fn new(endpoint_name: impl Into<String>, registration_delay: Duration) -> Self {
        Self {
            endpoint_name: endpoint_name.into(),
            registration_delay,
            fail_init: false,
            initialized: false,
            callback: None,
            producer: None,
            announced: Vec::new(),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            fail_init: config.client_init_failure,
            ..Self::new(
                config.endpoint_name.as_str(),
                Duration::from_millis(config.registration_delay_ms),
            )
        }
    }

    /// Make `init` fail
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Resources announced with the registration request
    pub fn announced(&self) -> &[ResourceDescriptor] {
        &self.announced
    }

    /// Deliver a remote operation as if it came from the service. Returns
    /// false before registration was requested or once dispatch has stopped.
    pub fn inject(&self, operation: InboundOperation) -> bool {
        match &self.producer {
            Some(producer) => post_inbound(producer, operation),
            None => false,
        }
    }
}

impl ManagementClient for SimulatedClient {
    fn init(&mut self, storage: &StorageHandle) -> Result<(), ClientInitError> {
        if self.fail_init {
            return Err(ClientInitError::new(
                DEVICE_ERROR_CODE,
                format!("storage '{}' unavailable", storage.mount_point),
            ));
        }
        self.initialized = true;
        info!(mount_point = %storage.mount_point, "Simulated management client initialized");
        Ok(())
    }

    fn notification_sink(&self, producer: AgentProducer) -> Box<dyn NotificationSink> {
        Box::new(SimulatedNotificationSink { producer })
    }

    fn on_registered(&mut self, callback: RegisteredCallback) {
        self.callback = Some(callback);
    }

    fn register_and_connect(&mut self, resources: Vec<ResourceDescriptor>, producer: AgentProducer) {
        self.announced = resources;
        self.producer = Some(producer);

        let Some(callback) = self.callback.take() else {
            warn!("Registration requested without an acknowledgment callback");
            return;
        };

        let endpoint = EndpointInfo::new(self.endpoint_name.as_str());
        let delay = self.registration_delay;
        let spawned = thread::Builder::new()
            .name("simulated-registration".to_string())
            .spawn(move || {
                thread::sleep(delay);
                debug!(endpoint = %endpoint, "Simulated service acknowledging registration");
                callback(endpoint);
            });

        if let Err(err) = spawned {
            warn!(error = %err, "Could not start simulated registration");
        }
    }
}

/// Reports each scheduled notification back as delivered
pub struct SimulatedNotificationSink {
    producer: AgentProducer,
}

impl NotificationSink for SimulatedNotificationSink {
    fn schedule(&mut self, path: &ResourcePath, value: &ResourceValue) {
        debug!(path = %path, value = %value, "Simulated notification sent");
        post_inbound(
            &self.producer,
            InboundOperation::DeliveryReport {
                path: path.to_string(),
                status: DeliveryStatus::Delivered,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AgentContext, AgentQueue};
    use crate::dispatch::DispatchExit;

    #[test]
    fn test_init_failure_from_config() {
        let config = SimulationConfig {
            client_init_failure: true,
            ..SimulationConfig::default()
        };
        let mut client = SimulatedClient::from_config(&config);
        let err = client.init(&StorageHandle::new("sd")).unwrap_err();
        assert_eq!(err.code, DEVICE_ERROR_CODE);
        assert!(!client.is_initialized());
    }

    #[test]
    fn test_acknowledges_registration_from_background_thread() {
        let mut queue = AgentQueue::new(AgentContext::new());
        let mut client = SimulatedClient::new("sim-endpoint", Duration::from_millis(5));

        let producer = queue.producer();
        client.on_registered(Box::new(move |endpoint: EndpointInfo| {
            let _ = producer.request_halt(endpoint.internal_endpoint_name);
        }));
        client.register_and_connect(Vec::new(), queue.producer());

        assert_eq!(
            queue.dispatch_forever(),
            DispatchExit::Halted {
                reason: "sim-endpoint".to_string()
            }
        );
    }

    #[test]
    fn test_sink_reports_delivery() {
        let mut queue = AgentQueue::new(AgentContext::new());
        let client = SimulatedClient::new("sim-endpoint", Duration::ZERO);
        let mut sink = client.notification_sink(queue.producer());

        sink.schedule(&ResourcePath::new(3200, 0, 5501), &ResourceValue::Integer(1));
        assert_eq!(queue.pending(), 1);
        // Unknown path on an empty registry: logged and dropped
        assert_eq!(queue.dispatch_pending(), 1);
    }
}
