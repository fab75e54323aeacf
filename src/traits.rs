//! Capability traits
//!
//! - `network`: callback-based and blocking request execution
//! - `cache`: callback-based and blocking cache access

pub mod cache;
pub mod network;

pub use cache::{AsyncCache, Cache, SyncCache};
pub use network::{AsyncNetwork, Network, SyncNetwork};
