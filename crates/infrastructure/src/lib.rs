//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod openobserve_client;
mod openobserve_config;

pub use openobserve_client::OpenObserveClient;
pub use openobserve_config::{DEFAULT_REQUEST_TIMEOUT, OpenObserveConfig};
