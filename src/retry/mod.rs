//! Retry module (ergonomic namespace)
//! - policy.rs: the `RetryPolicy` contract and the default timeout-growing policy
//! - backoff.rs: backoff crate-based policy with delays between attempts

pub mod backoff;
pub mod policy;

pub use self::backoff::*;
pub use policy::*;
