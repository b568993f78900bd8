//! Client core for the cars REST API.
//!
//! # Overview
//! Loads the car catalogue, loads the brands lookup list, and saves, updates
//! or deletes single cars. Requests are built and responses classified
//! without touching the network (host-does-IO pattern); the `session`
//! feature adds an async transport that runs those round trips itself.
//!
//! # Design
//! - `CarsClient` is stateless; it holds only the endpoint strings.
//! - Each operation is split into `build_*` (produces a request) and
//!   `parse_*` (classifies a response), so the I/O boundary is explicit and
//!   the FFI crate can reuse it without an async runtime.
//! - `Session` owns one shared, immutable `reqwest::Client` and exposes each
//!   operation as an `async fn`, plus `spawn_*` callback adapters.
//! - Only the car listing reports a typed `ClientError`. Brands collapse to
//!   `Option`, writes to `bool`.

#[cfg(feature = "session")]
pub mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
#[cfg(feature = "session")]
pub mod session;
pub mod types;

pub use client::CarsClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
#[cfg(feature = "session")]
pub use session::Session;
pub use types::{Brand, Car, Operation};
