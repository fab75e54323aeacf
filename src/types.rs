//! Core data types
//!
//! Request, response and cache entry types shared by the pipeline, the
//! transports and the capability traits.

pub mod cache;
pub mod config;
pub mod header;
pub mod request;
pub mod response;

pub use cache::CacheEntry;
pub use config::{NetworkConfig, NetworkConfigBuilder};
pub use header::{Header, contains_header, find_header};
pub use request::{Marker, Request, RequestBuilder};
pub use response::{NetworkResult, ResponseBody, WireResponse};
