//! Generated types for the Terraform plugin protocol v6
//!
//! Several generated messages share names with framework types
//! (`DynamicValue`, `Diagnostic`, `Schema`, `AttributePath`). Refer to them
//! through the `proto::` prefix.

#![allow(clippy::all)]

tonic::include_proto!("tfplugin6");

pub use provider_server::{Provider as ProviderService, ProviderServer as ProviderServiceServer};
