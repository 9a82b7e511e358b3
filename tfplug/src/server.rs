//! Server module for running Terraform providers
//!
//! Starts the gRPC server on a loopback port and prints the go-plugin
//! handshake line Terraform waits for on stdout.

use crate::error::{Result, TfplugError};
use crate::grpc::GrpcProviderServer;
use crate::proto::provider_server::ProviderServer;
use crate::provider::Provider;
use std::path::PathBuf;
use std::time::Duration;
use tonic::transport::{Identity, Server, ServerTlsConfig};

/// Environment variable Terraform sets when it launches a plugin.
pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

const CORE_PROTOCOL_VERSION: u32 = 1;
const PLUGIN_PROTOCOL_VERSION: u32 = 6;

/// Server configuration for running a Terraform provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PEM certificate; TLS is enabled only when both paths are set
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
    /// Maximum message size in bytes
    pub max_message_size: usize,
    /// Refuse to start unless launched by Terraform
    pub require_magic_cookie: bool,
    /// Timeout for graceful shutdown
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cert_path: None,
            key_path: None,
            max_message_size: 256 << 20, // 256MB
            require_magic_cookie: true,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tls(mut self, cert_path: PathBuf, key_path: PathBuf) -> Self {
        self.cert_path = Some(cert_path);
        self.key_path = Some(key_path);
        self
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Allows starting the server by hand, e.g. for debugging with reattach.
    pub fn without_magic_cookie(mut self) -> Self {
        self.require_magic_cookie = false;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// Returns an error when the process was not started by Terraform.
pub fn check_magic_cookie(value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if v == MAGIC_COOKIE_VALUE => Ok(()),
        _ => Err(TfplugError::Handshake(
            "This binary is a plugin. These are not meant to be executed directly. \
             Please execute the program that consumes these plugins, which will \
             load any plugins automatically"
                .to_string(),
        )),
    }
}

/// Handshake line read by Terraform: core version, protocol version,
/// network, address and protocol.
pub fn handshake_line(addr: std::net::SocketAddr) -> String {
    format!(
        "{}|{}|tcp|{}|grpc",
        CORE_PROTOCOL_VERSION, PLUGIN_PROTOCOL_VERSION, addr
    )
}

async fn load_tls(config: &ServerConfig) -> Result<Option<ServerTlsConfig>> {
    let (Some(cert_path), Some(key_path)) = (&config.cert_path, &config.key_path) else {
        return Ok(None);
    };

    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cert = tokio::fs::read(cert_path)
        .await
        .map_err(|e| TfplugError::Tls(format!("Failed to read certificate: {}", e)))?;
    let key = tokio::fs::read(key_path)
        .await
        .map_err(|e| TfplugError::Tls(format!("Failed to read key: {}", e)))?;

    Ok(Some(
        ServerTlsConfig::new().identity(Identity::from_pem(cert, key)),
    ))
}

/// Main entry point for running a provider
pub async fn serve<P: Provider + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    if config.require_magic_cookie {
        check_magic_cookie(std::env::var(MAGIC_COOKIE_KEY).ok().as_deref())?;
    }

    let grpc_server = GrpcProviderServer::new(provider);
    let provider_service = ProviderServer::new(grpc_server)
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let mut builder = Server::builder();
    if let Some(tls) = load_tls(&config).await? {
        builder = builder.tls_config(tls)?;
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tracing::info!("provider listening on {}", addr);
    println!("{}", handshake_line(addr));

    let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);
    let shutdown_timeout = config.shutdown_timeout;
    builder
        .add_service(provider_service)
        .serve_with_incoming_shutdown(incoming, async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!(
                "interrupt received, stopping within {:?}",
                shutdown_timeout
            );
        })
        .await?;

    Ok(())
}

/// Convenience function to run a provider with default configuration
pub async fn serve_default<P: Provider + 'static>(provider: P) -> Result<()> {
    serve(provider, ServerConfig::default()).await
}
