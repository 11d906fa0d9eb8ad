//! Host APIs for talking to the outside world.
//!
//! - [`http`] - HTTP client with tracing and domain allowlist
//! - [`session`] - Bearer credential access

pub mod http;
pub mod session;
