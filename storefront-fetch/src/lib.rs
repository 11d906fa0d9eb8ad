// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Storefront Fetch
//!
//! HTTP transport for the storefront commerce API.
//!
//! ## Host APIs
//!
//! - [`host::http`] - HTTP client with tracing and domain allowlist
//! - [`host::session`] - Bearer credential access ([`SessionVault`])
//!
//! ## Commerce Client
//!
//! [`CommerceClient`] implements [`storefront_core::CommerceApi`] on top of
//! the host HTTP client:
//!
//! - attaches `Authorization: Bearer <token>` when a credential exists
//! - purges the session on a 401
//! - turns every non-2xx response into a structured
//!   [`storefront_core::ApiFailure`] instead of an error
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use storefront_core::CommerceApi;
//! use storefront_fetch::{CommerceClient, MemorySession};
//!
//! let client = CommerceClient::new("https://shop.example.com/api/", Arc::new(MemorySession::new()))?;
//! let rates = client.fetch_currencies().await?;
//! ```

pub mod client;
pub mod error;
pub mod host;
pub mod retry;

pub use client::CommerceClient;
pub use error::{FetchError, HttpError};
pub use host::{
    http::{HttpClient, ResponseExt},
    session::{MemorySession, SessionVault},
};
pub use retry::RetryStrategy;
