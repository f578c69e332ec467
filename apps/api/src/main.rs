mod config;
mod db;
mod errors;
mod intake;
mod mappings;
mod matcher;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::intake::coordinator::IntakeCoordinator;
use crate::matcher::MatcherClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    let crate_filter = env!("CARGO_PKG_NAME").replace('-', "_");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", crate_filter, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Camber intake API v{}", env!("CARGO_PKG_VERSION"));
    if config.webhook_secret.is_none() {
        tracing::warn!("Running in open mode: webhook signatures will not be verified");
    }

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let store = Arc::new(intake::storage::S3ResumeStore::new(
        s3,
        config.s3_bucket.clone(),
    ));
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize the scoring-service client
    let matcher = Arc::new(MatcherClient::new(
        config.matcher_url.clone(),
        config.matcher_api_key.clone(),
        Duration::from_secs(config.matcher_timeout_secs),
    )?);
    info!("Matcher client initialized ({})", config.matcher_url);

    let repo = Arc::new(intake::repo::PgIntakeRepo::new(db.clone()));
    let intake = Arc::new(IntakeCoordinator::new(
        repo,
        store,
        matcher,
        config.payload_log_max_chars,
        Duration::from_secs(config.storage_timeout_secs),
    ));

    // Build app state
    let state = AppState {
        db,
        intake,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "camber-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
