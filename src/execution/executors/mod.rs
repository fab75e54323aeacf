//! Executors
//!
//! - `network`: the request execution pipeline
//! - `materialize`: pooled response body materialization

pub mod materialize;
pub mod network;

pub use materialize::materialize;
pub use network::{BasicNetwork, BasicNetworkBuilder, NetworkOutcome};
