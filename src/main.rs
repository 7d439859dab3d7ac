use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use leadhub::app;
use leadhub::config::Config;
use leadhub::db;
use leadhub::mailsource::SampleMailSource;
use leadhub::routes;
use leadhub::services::{pipeline, scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,leadhub=debug")),
        )
        .init();

    let config = Config::from_env();

    let db_url = db::normalize_sqlite_url(&config.database_url);
    db::ensure_db_file(&db_url);
    let pool = db::connect(&db_url).await?;

    if std::path::Path::new("migrations").exists() {
        db::run_migrations(&pool).await?;
    } else {
        tracing::warn!("migrations folder not found, skipping DB setup");
    }

    let port = config.port;
    let (state, jobs) = app::build_state(config, pool, Arc::new(SampleMailSource))?;

    // Start the stage dispatcher and the background ingest scheduler
    pipeline::run(state.clone(), jobs);
    scheduler::start(state.clone());

    let app = routes::routes(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let term = async {
        if let Ok(mut s) = signal::unix::signal(signal::unix::SignalKind::terminate()) {
            s.recv().await;
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();
    tokio::select! { _ = ctrl_c => {}, _ = term => {} }
}
