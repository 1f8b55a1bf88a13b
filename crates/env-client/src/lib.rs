//! HTTP client stack for the remote task environment
//!
//! This crate contains everything that talks to the environment server:
//! - [`http`]: transport with bounded retry and exponential backoff
//! - [`remote`]: typed client over the environment's endpoints
//! - [`lifecycle`]: the coordinator driving setup, hand-out and evaluation

pub mod http;
pub mod lifecycle;
pub mod remote;

pub use http::{RetryPolicy, RetryingClient};
pub use lifecycle::TaskCoordinator;
pub use remote::EnvironmentClient;
