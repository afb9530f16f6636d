use crossbeam::channel::{self, Receiver, RecvError, Sender, TryRecvError};
use serde::Serialize;
use tracing::{debug, info};

/// Work item executed on the dispatch context
pub type DeferredTask<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

enum Envelope<C> {
    Task(DeferredTask<C>),
    Halt(String),
}

/// Why `dispatch_forever` returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchExit {
    /// A producer requested a halt
    Halted { reason: String },
    /// Every producer is gone and the queue is empty
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Dispatch queue closed")]
    QueueClosed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub executed: u64,
    pub pending: usize,
}

/// Enqueue-only handle given to timer, interrupt and transport contexts.
///
/// It has no access to the context the tasks run against.
pub struct TaskProducer<C> {
    sender: Sender<Envelope<C>>,
}

impl<C> Clone for TaskProducer<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C> std::fmt::Debug for TaskProducer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskProducer")
            .field("pending", &self.sender.len())
            .finish()
    }
}

impl<C> TaskProducer<C> {
    /// Enqueue a task. Never blocks.
    pub fn post<F>(&self, task: F) -> Result<(), DispatchError>
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.sender
            .send(Envelope::Task(Box::new(task)))
            .map_err(|_| DispatchError::QueueClosed)
    }

    /// Ask `dispatch_forever` to return once every task queued before this
    /// request has run.
    pub fn request_halt(&self, reason: impl Into<String>) -> Result<(), DispatchError> {
        self.sender
            .send(Envelope::Halt(reason.into()))
            .map_err(|_| DispatchError::QueueClosed)
    }
}

/// Owner of the dispatch context and the consuming end of the queue
pub struct DeferredQueue<C> {
    context: C,
    sender: Sender<Envelope<C>>,
    receiver: Receiver<Envelope<C>>,
    executed: u64,
}

impl<C> DeferredQueue<C> {
    pub fn new(context: C) -> Self {
        let (sender, receiver) = channel::unbounded();
        Self {
            context,
            sender,
            receiver,
            executed: 0,
        }
    }

    pub fn producer(&self) -> TaskProducer<C> {
        TaskProducer {
            sender: self.sender.clone(),
        }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Direct access for the owning thread, outside of dispatch
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            executed: self.executed,
            pending: self.receiver.len(),
        }
    }

    /// Run every task already queued, without blocking. A queued halt
    /// request stops the drain early and is consumed.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut ran = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(Envelope::Task(task)) => {
                    self.execute(task);
                    ran += 1;
                }
                Ok(Envelope::Halt(reason)) => {
                    debug!(reason = %reason, "Halt request consumed while draining");
                    break;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        ran
    }

    /// Block forever, executing tasks in submission order. Returns only on a
    /// halt request or when no producer can post anymore.
    ///
    /// Producers created after this returns are detached from the queue.
    pub fn dispatch_forever(&mut self) -> DispatchExit {
        info!("Dispatching deferred tasks");
        // Our own sender would keep the channel open forever; producers hold clones.
        let (replacement, _) = channel::unbounded();
        drop(std::mem::replace(&mut self.sender, replacement));

        let exit = loop {
            match self.receiver.recv() {
                Ok(Envelope::Task(task)) => self.execute(task),
                Ok(Envelope::Halt(reason)) => break DispatchExit::Halted { reason },
                Err(RecvError) => break DispatchExit::Disconnected,
            }
        };

        info!(executed = self.executed, exit = ?exit, "Dispatch loop stopped");
        exit
    }

    fn execute(&mut self, task: DeferredTask<C>) {
        task(&mut self.context);
        self.executed += 1;
    }
}
