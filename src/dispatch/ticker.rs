//! Periodic timer source. Each tick enqueues a task; the timer thread itself
//! never touches the dispatch context.

use super::queue::TaskProducer;
use crossbeam::channel::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

pub struct Ticker {
    name: String,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start posting `task` every `interval` until the ticker is dropped or
    /// the queue goes away.
    pub fn spawn<C, F>(
        name: &str,
        interval: Duration,
        producer: TaskProducer<C>,
        task: F,
    ) -> std::io::Result<Self>
    where
        C: 'static,
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let task = Arc::new(task);
        let thread_name = name.to_string();

        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            let ticks = channel::tick(interval);
            loop {
                crossbeam::select! {
                    recv(ticks) -> _ => {
                        let task = Arc::clone(&task);
                        if producer.post(move |ctx| task(ctx)).is_err() {
                            warn!(ticker = %thread_name, "Dispatch queue closed, ticker stopping");
                            break;
                        }
                    }
                    recv(stop_rx) -> _ => break,
                }
            }
            debug!(ticker = %thread_name, "Ticker stopped");
        })?;

        debug!(ticker = %name, interval_ms = interval.as_millis() as u64, "Ticker started");
        Ok(Self {
            name: name.to_string(),
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        // Disconnecting the stop channel wakes the timer thread.
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
