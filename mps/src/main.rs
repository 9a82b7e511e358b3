use tencentcloud_mps::TencentCloudProvider;
use tfplug::ServerConfig;
use tracing::Level;

/// Terraform passes its log level down through these variables.
fn log_level() -> Level {
    ["TF_LOG_PROVIDER", "TF_LOG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| value.parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

#[tokio::main]
async fn main() -> tfplug::Result<()> {
    // stdout carries the plugin handshake
    tracing_subscriber::fmt()
        .with_max_level(log_level())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tfplug::serve(TencentCloudProvider::new(), ServerConfig::default()).await
}
