//! Core library for the arena bridge
//!
//! This crate contains the shared building blocks, including:
//! - Session configuration and the pending task queue
//! - Dataset roster loading
//! - Task records, sandbox hand-off data and evaluation results
//! - JSON result envelopes returned by every tool

pub mod dataset;
pub mod envelope;
pub mod error;
pub mod queue;
pub mod session;
pub mod task;

pub use error::{Error, ErrorKind};
pub type Result<T> = std::result::Result<T, Error>;
