//! Error Handling Module
//!
//! - Pipeline failure taxonomy (`NetworkError`, `ErrorCategory`)
//! - Transport-level failures (`TransportError`)
//! - Conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use fetchline::error::{ErrorCategory, NetworkError};
//!
//! let error = NetworkError::Timeout;
//! assert_eq!(error.category(), ErrorCategory::Timeout);
//! assert!(error.is_retryable());
//! ```

mod conversions;
pub mod types;

pub use types::*;
