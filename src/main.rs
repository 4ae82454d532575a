//! listhub server entry point.
//!
//! Wires the repository, search client, event bus, and processors, then
//! serves the REST API until Ctrl-C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use listhub::api;
use listhub::app_state::AppState;
use listhub::config::{AppConfig, LogFormat};
use listhub::events::EventBus;
use listhub::persistence::{InMemoryListRepository, ListRepository, PostgresListRepository};
use listhub::pipeline::{Pipeline, PipelineConfig};
use listhub::processors::log_completion;
use listhub::reporting::TracingReporter;
use listhub::search::{AlgoliaSearchClient, InMemorySearchClient, SearchClient};
use listhub::service::ListService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting listhub");

    let repository = build_repository(&config).await?;
    let search = build_search_client(&config)?;

    let event_bus = EventBus::new(config.event_bus_max_inflight);
    let on_complete = log_completion(Arc::new(TracingReporter));
    let pipeline = Pipeline::start(
        &event_bus,
        Arc::clone(&repository),
        search,
        &on_complete,
        PipelineConfig {
            channel_capacity: config.processor_channel_capacity,
            reindex_batch_size: config.reindex_batch_size,
        },
    );

    let app_state = AppState::new(ListService::new(repository, event_bus));
    let app = api::build_app(app_state, config.request_timeout);
    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    pipeline.abort();
    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn ListRepository>> {
    if !config.persistence_enabled {
        tracing::warn!("persistence disabled; lists are kept in memory only");
        return Ok(Arc::new(InMemoryListRepository::new()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await
        .context("connecting to PostgreSQL")?;
    let repository = PostgresListRepository::new(pool);
    repository.migrate().await.context("running migrations")?;
    tracing::info!("connected to PostgreSQL");
    Ok(Arc::new(repository))
}

fn build_search_client(config: &AppConfig) -> anyhow::Result<Arc<dyn SearchClient>> {
    match &config.search {
        Some(search) => {
            let client = AlgoliaSearchClient::new(search.clone())
                .context("building search client")?;
            tracing::info!(index = %search.index_name, "search indexing enabled");
            Ok(Arc::new(client))
        }
        None => {
            tracing::warn!("SEARCH_APP_ID/SEARCH_API_KEY not set; using in-memory search index");
            Ok(Arc::new(InMemorySearchClient::new()))
        }
    }
}

/// Completes on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
