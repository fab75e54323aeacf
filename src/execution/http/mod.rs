//! HTTP Utilities
//!
//! This module contains HTTP-related utilities:
//! - Conditional request headers and 304 header merging
//! - The transport abstraction and its blocking adapter
//! - The `reqwest` transport

pub mod headers;
pub mod reqwest_transport;
pub mod transport;

// Re-export main types
pub use headers::*;
pub use reqwest_transport::ReqwestTransport;
pub use transport::*;
