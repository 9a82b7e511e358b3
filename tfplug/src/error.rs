//! Framework errors

/// Failures of the value codecs and of the plugin server.
///
/// Handler failures never show up here: resources and data sources report
/// them to Terraform as diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("decoding failed: {0}")]
    Decoding(String),

    #[error("expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("invalid attribute path: {0}")]
    Path(String),

    /// The process was not launched by Terraform.
    #[error("{0}")]
    Handshake(String),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "grpc")]
    #[error(transparent)]
    Transport(#[from] tonic::transport::Error),
}

pub type Result<T> = std::result::Result<T, TfplugError>;
