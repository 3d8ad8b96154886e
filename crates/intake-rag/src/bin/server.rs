//! Intake server binary
//!
//! Run with: cargo run -p intake-rag --bin intake-rag-server [config.toml]

use intake_rag::{config::IntakeConfig, server::IntakeServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Optional config file as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => IntakeConfig::from_file(&path)?,
        None => IntakeConfig::default(),
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Input directory: {}", config.storage.input_dir.display());
    tracing::info!("  - Working directory: {}", config.storage.working_dir.display());
    tracing::info!(
        "  - Supported extensions: {}",
        config.storage.supported_extensions.join(", ")
    );
    tracing::info!("  - Max upload size: {} bytes", config.server.max_upload_size);

    let server = IntakeServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /documents/upload                  - Upload a document");
    println!("  GET  /documents/track_status/:track_id  - Poll indexing progress");
    println!("  GET  /documents/statuses                - List document statuses");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
