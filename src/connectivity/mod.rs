//! # Connectivity Manager
//!
//! Brings the network link up before anything else in the agent runs.
//!
//! ## Overview
//!
//! Each connection attempt produces a [`ConnectOutcome`]. The manager classifies
//! it and decides whether to stop, retry or give up:
//!
//! ```text
//! ┌──────────────┐    ┌────────────────────┐    ┌───────────────────────┐
//! │ NetworkLink  │───▶│ ConnectivityManager│───▶│ Connected / ConnectErr│
//! │ connect()    │    │ classify + backoff │    │                       │
//! └──────────────┘    └────────────────────┘    └───────────────────────┘
//! ```
//!
//! - **AuthenticationFailure** is never retried.
//! - **Transient and fatal codes** are retried until the retry counter exceeds
//!   `max_retries`, then reported as [`ConnectError::Exhausted`].

pub mod backoff;
pub mod link;
pub mod manager;

pub use backoff::BackoffPolicy;
pub use link::{ConnectOutcome, NetworkLink};
pub use manager::{classify_outcome, AttemptClass, ConnectError, Connected, ConnectivityManager};
