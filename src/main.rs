//! Trivia Back binary entrypoint wiring configuration, storage, the slides provider and REST routes.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_back::{
    config::AppConfig,
    dao::session_store,
    routes,
    services::allocator::SessionCodeAllocator,
    slides::{
        PresentationProvider,
        google::{GoogleSlidesClient, GoogleSlidesConfig},
    },
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let store = session_store::connect(&config.database_url, config.max_connections)
        .await
        .context("connecting to session store")?;
    let slides = build_slides_provider(&config)?;
    let allocator = SessionCodeAllocator::new(config.allocation_attempts);

    let app = build_router(AppState::new(store, slides, allocator));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the Google Slides client when a service account key is configured.
fn build_slides_provider(
    config: &AppConfig,
) -> anyhow::Result<Option<Arc<dyn PresentationProvider>>> {
    let Some(key) = config
        .service_account_key()
        .context("loading service account key")?
    else {
        warn!("no service account key configured; slide routes will fail");
        return Ok(None);
    };

    let mut slides_config = GoogleSlidesConfig::new(key);
    if let Some(base_url) = &config.slides_api_base_url {
        slides_config = slides_config.with_api_base_url(base_url.clone());
    }
    let client = GoogleSlidesClient::new(slides_config).context("building slides client")?;
    info!("google slides provider configured");
    Ok(Some(Arc::new(client)))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
