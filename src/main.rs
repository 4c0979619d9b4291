use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rebound_publisher::adapters::{FacebookAdapter, WordPressAdapter};
use rebound_publisher::config::Config;
use rebound_publisher::db::Database;
use rebound_publisher::publish::Orchestrator;
use rebound_publisher::{scheduler, web};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting rebound-publisher");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(wp_url = %config.wp_url, fb_page = %config.fb_page_id, "Configuration loaded");

    if let Some(parent) = config.database_path.parent() {
        tokio::fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }

    let db = Database::new(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    info!("Database initialized");

    let wordpress = Arc::new(WordPressAdapter::new(
        &config.wp_url,
        &config.wp_user,
        &config.wp_app_password,
        config.public_base_url.clone(),
    ));
    let facebook = Arc::new(FacebookAdapter::new(
        &config.fb_graph_url,
        &config.fb_page_id,
        &config.fb_access_token,
        config.public_base_url.clone(),
    ));

    let orchestrator = Arc::new(Orchestrator::new(
        db.clone(),
        wordpress,
        facebook,
        config.adapter_timeout,
    ));

    // Scheduler loops: due-check for scheduled posts and the queue drain.
    let scheduled_handle = tokio::spawn(scheduler::scheduled_loop(
        Arc::clone(&orchestrator),
        config.scheduled_check_interval,
    ));
    let queue_handle = tokio::spawn(scheduler::queue_loop(
        Arc::clone(&orchestrator),
        config.publish_interval,
    ));
    info!(
        scheduled_check_secs = config.scheduled_check_interval.as_secs(),
        publish_secs = config.publish_interval.as_secs(),
        "Scheduler started"
    );

    let web_config = config.clone();
    let web_db = db.clone();
    let web_orchestrator = Arc::clone(&orchestrator);
    let web_handle = tokio::spawn(async move {
        if let Err(e) = web::serve(&web_config, web_db, web_orchestrator).await {
            error!("Web server error: {e:#}");
        }
    });

    shutdown_signal().await;

    info!("Shutting down...");

    web_handle.abort();
    scheduled_handle.abort();
    queue_handle.abort();

    info!("Shutdown complete");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rebound_publisher=debug"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
