//! The dispatch context: everything deferred tasks are allowed to touch.

use crate::dispatch::{DeferredQueue, DeferredTask, TaskProducer};
use crate::registry::{DeliveryStatus, InboundOutcome, ResourceRegistry, ResourceValue};
use crate::state_machine::RegistrationStateMachine;
use tracing::warn;

/// State owned by the dispatch loop
#[derive(Debug, Default)]
pub struct AgentContext {
    pub registry: ResourceRegistry,
    pub registration: RegistrationStateMachine,
}

impl AgentContext {
    pub fn new() -> Self {
        Self::default()
    }
}

pub type AgentQueue = DeferredQueue<AgentContext>;
pub type AgentProducer = TaskProducer<AgentContext>;
pub type AgentTask = DeferredTask<AgentContext>;

/// Inbound remote operation as delivered by the management client
#[derive(Debug, Clone, PartialEq)]
pub enum InboundOperation {
    Put { path: String, value: ResourceValue },
    Post { path: String, payload: Vec<u8> },
    DeliveryReport { path: String, status: DeliveryStatus },
}

impl InboundOperation {
    /// Apply the operation to the registry. Errors are logged, never raised:
    /// a bad remote request must not stop the dispatch loop.
    pub fn apply(self, ctx: &mut AgentContext) -> Option<InboundOutcome> {
        let result = match self {
            Self::Put { path, value } => ctx
                .registry
                .handle_remote_put(&path, value)
                .map_err(|err| (path, err)),
            Self::Post { path, payload } => ctx
                .registry
                .handle_remote_post(&path, &payload)
                .map_err(|err| (path, err)),
            Self::DeliveryReport { path, status } => ctx
                .registry
                .report_delivery(&path, status)
                .map(|()| InboundOutcome::Applied)
                .map_err(|err| (path, err)),
        };

        match result {
            Ok(outcome) => Some(outcome),
            Err((path, err)) => {
                warn!(path = %path, error = %err, "Inbound operation rejected");
                None
            }
        }
    }
}

/// Post an inbound operation onto the dispatch queue
pub fn post_inbound(producer: &AgentProducer, operation: InboundOperation) -> bool {
    producer
        .post(move |ctx: &mut AgentContext| {
            operation.apply(ctx);
        })
        .is_ok()
}
