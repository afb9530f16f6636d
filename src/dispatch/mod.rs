//! # Deferred Execution Queue
//!
//! Single-threaded cooperative FIFO scheduler. Timer and interrupt sources
//! hold a [`TaskProducer`] and can only enqueue; the context the tasks mutate
//! is owned by the [`DeferredQueue`] and reachable only from inside a task.
//!
//! ```text
//! timer / interrupt ──post──▶ ┌──────────────┐ ──recv──▶ task(&mut context)
//! transport thread  ──post──▶ │ unbounded    │           (one at a time,
//! ticker            ──post──▶ │ FIFO channel │            submission order)
//!                             └──────────────┘
//! ```

pub mod queue;
pub mod ticker;

pub use queue::{DeferredQueue, DeferredTask, DispatchError, DispatchExit, QueueStats, TaskProducer};
pub use ticker::Ticker;
