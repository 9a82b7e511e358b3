//! tfplug - Terraform Plugin Framework for Rust
//!
//! A framework for building Terraform providers in Rust, implementing the
//! Terraform Plugin Protocol 6. The gRPC transport lives behind the `grpc`
//! feature; everything else (schemas, values, planning, validation) is plain
//! Rust and usable from tests without `protoc`.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;
pub mod value;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod import;
pub mod plan;
pub mod plan_modifier;
pub mod retry;
pub mod validator;

#[cfg(feature = "grpc")]
pub mod grpc;
#[cfg(feature = "grpc")]
pub mod proto;
#[cfg(feature = "grpc")]
pub mod server;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use provider::{Provider, ProviderMetadataRequest, ProviderMetadataResponse};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use retry::{RetryError, RetryPolicy};
pub use schema::{AttributeBuilder, AttributeType, BlockBuilder, Schema, SchemaBuilder};
#[cfg(feature = "grpc")]
pub use server::{serve, serve_default, ServerConfig};
pub use types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

// Convenience macro for main function
#[cfg(feature = "grpc")]
#[macro_export]
macro_rules! serve_provider {
    ($provider:expr) => {
        #[tokio::main]
        async fn main() -> $crate::Result<()> {
            $crate::serve($provider, $crate::ServerConfig::default()).await
        }
    };
    ($provider:expr, $config:expr) => {
        #[tokio::main]
        async fn main() -> $crate::Result<()> {
            $crate::serve($provider, $config).await
        }
    };
}
