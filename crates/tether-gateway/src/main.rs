mod cli;

use crate::cli::{StorageBackendArg, CLI};
use clap::Parser;
use std::sync::Arc;
use tether_core::Shortener;
use tether_gateway::telemetry::init_tracing;
use tether_gateway::{App, AppState};
use tether_generator::Base62Generator;
use tether_sequence::{ClockSequence, ClockSequenceSettings};
use tether_shortener::ShortenerService;
use tether_storage::{InMemoryLinkStore, PostgresLinkStore};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        host = %config.host,
        port = config.port,
        storage_backend = %config.storage,
        node_id = config.node_id,
        "starting tether gateway"
    );

    let sequence = ClockSequence::new(
        ClockSequenceSettings::builder()
            .node_id(config.node_id)
            .build(),
    )?;
    let generator = Base62Generator::builder()
        .sequence(sequence)
        .min_width(config.min_code_width)
        .build();

    match config.storage {
        StorageBackendArg::InMemory => {
            let service = ShortenerService::new(InMemoryLinkStore::new(), generator);
            run_server(&config, Arc::new(service)).await?;
        }
        StorageBackendArg::Postgres => {
            let store = Arc::new(PostgresLinkStore::connect(&config.postgres_settings()).await?);
            store.ensure_schema().await?;

            let service = ShortenerService::from_shared(Arc::clone(&store), Arc::new(generator));
            let served = run_server(&config, Arc::new(service)).await;

            store.close().await;
            info!("postgres pool closed");
            served?;
        }
    }

    info!("tether gateway stopped");
    Ok(())
}

async fn run_server(config: &CLI, shortener: Arc<dyn Shortener>) -> std::io::Result<()> {
    let app = App::router(AppState::new(shortener), config.timeouts());

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received, draining connections");
}
