//! Telnyx v2 REST API
//!
//! Endpoints are grouped by area behind borrowed accessors on [`Client`],
//! e.g. `client.voice().fqdn_connections().get(id)`.

pub mod billing;
pub mod client;
pub mod common;
pub mod error;
pub mod messaging;
pub mod numbers;
pub mod voice;

pub use client::Client;
pub use common::ApiQueryParams;
pub use error::ApiError;
