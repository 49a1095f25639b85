//! formfill server binary.
//!
//! Configuration comes from `FORMFILL__*` environment variables (see
//! [`formfill::config`]).

use std::sync::Arc;

use http::HeaderValue;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use formfill::adapters::collaborator::{
    HttpCollaboratorConfig, HttpFormCollaborator, LocalFormCollaborator,
};
use formfill::adapters::document::FormDocumentWriter;
use formfill::adapters::http::{api_router, DialogHandlers};
use formfill::adapters::storage::InMemorySessionStore;
use formfill::application::{DialogService, IdleSweeper, SessionController, SweeperConfig};
use formfill::config::{AppConfig, ServerConfig};
use formfill::ports::FormCollaborator;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "formfill exited with an error");
        eprintln!("formfill: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let documents = FormDocumentWriter::new(
        config.documents.output_dir.clone(),
        config.documents.download_prefix.clone(),
    );

    let collaborator: Arc<dyn FormCollaborator> = if config.collaborator.is_remote() {
        let base_url = config.collaborator.base_url.clone().unwrap_or_default();
        let mut remote =
            HttpCollaboratorConfig::new(base_url.clone()).with_timeout(config.collaborator.timeout());
        if let Some(token) = config.collaborator.api_token() {
            remote = remote.with_api_token(token);
        }
        info!(base_url = %base_url, "Using remote form collaborator");
        Arc::new(HttpFormCollaborator::new(remote)?)
    } else {
        info!(
            output_dir = %config.documents.output_dir.display(),
            "Using local form collaborator"
        );
        Arc::new(LocalFormCollaborator::new(documents.clone()))
    };

    let controller =
        SessionController::new(collaborator).with_call_timeout(config.collaborator.timeout());
    let service = Arc::new(DialogService::new(
        controller,
        Arc::new(InMemorySessionStore::new()),
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = match config.sessions.idle_timeout() {
        Some(max_idle) => {
            info!(idle_secs = max_idle.as_secs(), "Idle session eviction enabled");
            let sweeper_config = SweeperConfig::default()
                .with_max_idle(max_idle)
                .with_interval(config.sessions.sweep_interval());
            let sweeper = IdleSweeper::new(Arc::clone(&service), sweeper_config);
            Some(tokio::spawn(async move { sweeper.run(shutdown_rx).await }))
        }
        None => None,
    };
    let handlers = DialogHandlers::new(service, Arc::new(documents));

    let app = api_router(handlers)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, collaborator = ?config.collaborator.mode, "formfill listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The receiver is gone when the sweeper is disabled.
    let _ = shutdown_tx.send(true);
    if let Some(sweeper) = sweeper {
        sweeper.await?;
    }
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_filter.clone()));
    if server.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .origins()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
