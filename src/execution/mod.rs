//! Request execution
//!
//! - `http`: headers, transports
//! - `executors`: the request pipeline and body materialization

pub mod executors;
pub mod http;
