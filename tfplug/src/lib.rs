//! tfplug - Terraform Plugin Framework for Rust
//!
//! A framework for building Terraform providers in Rust. Providers implement
//! the [`Provider`], [`Resource`] and [`DataSource`] traits. The
//! [`server::ProviderServer`] drives them through the plan/apply lifecycle,
//! [`grpc::GrpcProvider`] exposes that lifecycle as the tfplugin6 service and
//! [`serve()`] runs it as a Terraform plugin process.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod defaults;
pub mod import;
pub mod plan_modifier;
pub mod validator;

pub mod codec;
pub mod grpc;
pub mod proto;
pub mod serve;
pub mod server;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use provider::{DataSourceFactory, Provider, ResourceFactory};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use serve::{serve, ServeConfig};
pub use server::ProviderServer;
pub use types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
