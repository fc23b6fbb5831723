use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{
    AppState, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_MAX_UPLOAD_BYTES, ServerLimits,
};
use qphotos_core::constants::{DEFAULT_LAST_PROJECT_FILE, DEFAULT_UPLOAD_DIR};
use qphotos_core::{CoreConfig, FileLastProjectStore, PhotoStore, positive_usize_from_env_value};
use qphotos_media::WatermarkAnnotator;

/// Main entry point for the QPhotos server
///
/// Loads configuration from the environment (and a `.env` file if present),
/// opens the photo store and serves the REST API until the process is stopped.
///
/// # Environment Variables
/// - `QPHOTOS_REST_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `QPHOTOS_UPLOAD_DIR`: Storage root for photos (default: "upload")
/// - `QPHOTOS_LAST_PROJECT_FILE`: File recording the last project (default: "last_project.txt")
/// - `QPHOTOS_FONT_PATH`: TrueType font for upload captions (default: common system fonts)
/// - `QPHOTOS_MAX_UPLOAD_BYTES`: Largest accepted upload body (default: 50 MiB)
/// - `QPHOTOS_MAX_CONCURRENT_REQUESTS`: Requests served at the same time (default: 8)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qphotos_run=info".parse()?)
                .add_directive("qphotos_core=info".parse()?)
                .add_directive("qphotos_media=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("QPHOTOS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());
    let upload_dir = std::env::var("QPHOTOS_UPLOAD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR));
    let last_project_file = std::env::var("QPHOTOS_LAST_PROJECT_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LAST_PROJECT_FILE));
    let font_path = std::env::var("QPHOTOS_FONT_PATH").ok().map(PathBuf::from);

    let limits = ServerLimits {
        max_upload_bytes: positive_usize_from_env_value(
            "QPHOTOS_MAX_UPLOAD_BYTES",
            std::env::var("QPHOTOS_MAX_UPLOAD_BYTES").ok(),
            DEFAULT_MAX_UPLOAD_BYTES,
        )?,
        max_concurrent_requests: positive_usize_from_env_value(
            "QPHOTOS_MAX_CONCURRENT_REQUESTS",
            std::env::var("QPHOTOS_MAX_CONCURRENT_REQUESTS").ok(),
            DEFAULT_MAX_CONCURRENT_REQUESTS,
        )?,
    };

    let cfg = CoreConfig::new(upload_dir, last_project_file)?;
    tracing::info!("++ Storing photos under {}", cfg.upload_dir().display());

    let last_project = FileLastProjectStore::new(cfg.last_project_file());
    let annotator = WatermarkAnnotator::from_font_path(font_path.as_deref());
    let store = Arc::new(PhotoStore::new(
        Arc::new(cfg),
        Arc::new(annotator),
        Arc::new(last_project),
    )?);

    let app = api_rest::router(AppState::new(store), limits);

    tracing::info!("++ Starting QPhotos REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
