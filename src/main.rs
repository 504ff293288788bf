mod config;
mod error;
mod geo;
mod region;
mod routes;
mod services;
mod state;
mod storage;
mod theme;
mod tmdb;

use std::sync::Arc;
use std::time::Duration;

use time::UtcOffset;

use crate::config::AppConfig;
use crate::geo::{GeoChain, GeoFormat, GeoLocator, HttpGeoProvider};
use crate::region::RegionResolver;
use crate::services::library::Library;
use crate::services::suggestions::SuggestionService;
use crate::state::{AppState, FallbackStats, Session};
use crate::storage::{FileStore, KeyValueStore};
use crate::theme::ThemeScheduler;
use crate::tmdb::{MovieCatalog, TmdbClient};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> std::process::ExitCode {
    // The local offset must be read before the runtime spawns threads.
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "failed to start tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(local_offset)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "cinescope exited with error");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(local_offset: UtcOffset) -> Result<(), BoxError> {
    let config = AppConfig::from_env()?;

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.store_path)?);

    let tmdb = TmdbClient::new(&config.tmdb, config.timeouts)?;
    if !tmdb.has_api_key() {
        tracing::warn!("TMDB_API_KEY not set; every catalog request will fail");
    }
    let catalog: Arc<dyn MovieCatalog> = Arc::new(tmdb);

    let primary = HttpGeoProvider::new(
        &config.geo.primary_url,
        config.geo.primary_api_key.clone(),
        GeoFormat::IpApi,
        config.timeouts,
    )?;
    let secondary = HttpGeoProvider::new(&config.geo.secondary_url, None, GeoFormat::IpWho, config.timeouts)?;
    let geo: Arc<dyn GeoLocator> = Arc::new(GeoChain::new(Arc::new(primary), Some(Arc::new(secondary))));

    let fallbacks = FallbackStats::new();
    let session = Session::new(ThemeScheduler::stored_mode(store.as_ref()));

    let region = RegionResolver::new(
        store.clone(),
        catalog.clone(),
        geo.clone(),
        session.clone(),
        fallbacks.clone(),
        config.default_region.clone(),
    );
    let theme = ThemeScheduler::new(
        store.clone(),
        geo,
        session.clone(),
        fallbacks.clone(),
        Duration::from_secs(config.theme_tick_secs),
        local_offset,
    );
    let state = AppState {
        session: session.clone(),
        catalog: catalog.clone(),
        region: region.clone(),
        theme: theme.clone(),
        library: Library::new(store, fallbacks.clone()),
        suggestions: SuggestionService::new(
            catalog,
            Duration::from_millis(config.suggest_debounce_ms),
            fallbacks.clone(),
        ),
        fallbacks,
        default_region: config.default_region.clone(),
    };

    let _event_logger = crate::state::spawn_event_logger(&session);
    let _theme_loop = theme.spawn();
    let _initial_region = tokio::spawn({
        let region = region.clone();
        async move { region.resolve_region_and_load_content(false).await }
    });

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, store = %config.store_path.display(), "cinescope listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(region))
        .await?;
    Ok(())
}

async fn shutdown_signal(region: RegionResolver) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
    region.cancel().await;
}
