// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `relaybox serve` command implementation.
//!
//! Opens the store, builds the side-service clients, the file registry and
//! the command dispatcher, then runs Telegram polling and the optional HTTP
//! endpoint until SIGINT or SIGTERM. Shutdown waits for in-flight side
//! effects and checkpoints the database.

use std::sync::Arc;
use std::time::Instant;

use relaybox_bot::Dispatcher;
use relaybox_config::RelayboxConfig;
use relaybox_core::{
    DriveMirror, FileAnalyzer, MetadataStore, PluginAdapter, RelayboxError, UrlShortener,
};
use relaybox_gdrive::DriveClient;
use relaybox_gemini::GeminiClient;
use relaybox_gplinks::GplinksShortener;
use relaybox_registry::{FileRegistry, RegistryOptions};
use relaybox_storage::SqliteStorage;
use relaybox_telegram::{TelegramRelay, run_polling};
use tracing::{error, info, warn};

use crate::server::{self, AppState};
use crate::shutdown;

/// Side-service clients that are configured, as trait objects.
struct Services {
    shortener: Option<Arc<dyn UrlShortener>>,
    mirror: Option<Arc<dyn DriveMirror>>,
    analyzer: Option<Arc<dyn FileAnalyzer>>,
}

fn build_services(config: &RelayboxConfig) -> Result<Services, RelayboxError> {
    let shortener = GplinksShortener::new(&config.gplinks)?;
    let mirror = DriveClient::new(&config.gdrive)?;
    let analyzer = GeminiClient::new(&config.gemini)?;

    let services = Services {
        shortener: shortener
            .is_configured()
            .then(|| Arc::new(shortener) as Arc<dyn UrlShortener>),
        mirror: mirror
            .is_configured()
            .then(|| Arc::new(mirror) as Arc<dyn DriveMirror>),
        analyzer: analyzer
            .is_configured()
            .then(|| Arc::new(analyzer) as Arc<dyn FileAnalyzer>),
    };

    info!(
        shortener = services.shortener.is_some(),
        mirror = services.mirror.is_some(),
        analyzer = services.analyzer.is_some(),
        "side services configured"
    );
    Ok(services)
}

/// Runs the `relaybox serve` command.
pub async fn run_serve(config: RelayboxConfig) -> Result<(), RelayboxError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting relaybox serve");

    let store: Arc<dyn MetadataStore> = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };

    let relay = Arc::new(TelegramRelay::new(&config.telegram, &config.files)?);
    match relay.health_check().await {
        Ok(status) => info!(?status, "Telegram bot reachable"),
        Err(e) => warn!(error = %e, "Telegram health check failed, continuing"),
    }

    let services = build_services(&config)?;

    let mut registry = FileRegistry::new(
        Arc::clone(&store),
        relay.clone(),
        RegistryOptions::from_config(&config),
    )
    .with_notifier(relay.clone());
    if let Some(mirror) = &services.mirror {
        registry = registry.with_mirror(Arc::clone(mirror));
    }
    if let Some(analyzer) = &services.analyzer {
        registry = registry.with_analyzer(Arc::clone(analyzer));
    }
    let registry = Arc::new(registry);

    let mut dispatcher = Dispatcher::new(Arc::clone(&registry), Arc::clone(&store))
        .with_admins(config.telegram.admin_users.clone());
    if let Some(shortener) = services.shortener {
        dispatcher = dispatcher.with_shortener(shortener);
    }
    if let Some(analyzer) = services.analyzer {
        dispatcher = dispatcher.with_analyzer(analyzer);
    }
    let dispatcher = Arc::new(dispatcher);

    let cancel = shutdown::install_signal_handler();

    let http = if config.server.enabled {
        let state = AppState {
            store: Arc::clone(&store),
            started: Instant::now(),
        };
        let server_config = config.server.clone();
        let server_cancel = cancel.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = server::start_server(&server_config, state, server_cancel.clone()).await
            {
                error!(error = %e, "HTTP server failed");
                server_cancel.cancel();
            }
        }))
    } else {
        info!("HTTP server disabled");
        None
    };

    run_polling(relay.bot().clone(), dispatcher, cancel.clone()).await;

    // Polling can also stop on its own (e.g. a rejected token).
    cancel.cancel();
    if let Some(handle) = http
        && let Err(e) = handle.await
    {
        warn!(error = %e, "HTTP server task ended abnormally");
    }

    info!("waiting for background side effects");
    registry.side_effects().drain().await;

    if let Err(e) = store.close().await {
        warn!(error = %e, "failed to checkpoint database on shutdown");
    }

    info!("relaybox serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("relaybox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
