/*
 * Responsibility
 * - tracing + panic hook
 * - Config load → dependency construction → Router assembly
 * - Router-wide middleware (HTTP infra / CORS)
 * - axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, StoreBackend};
use crate::middleware;
use crate::repos::PgSessionRepo;
use crate::services::auth::store::ValkeyCredentialStore;
use crate::services::auth::{
    AlgorithmPolicy, CredentialStore, StaticSecret, TokenVerifier,
};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,inventory_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash loudly. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    // Missing JWT_SECRET (or any other required key) stops us here, before binding.
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let secrets = Arc::new(StaticSecret::new(config.jwt_secret.clone()));
    let verifier = TokenVerifier::new(
        AlgorithmPolicy::hmac(),
        secrets,
        config.token_leeway_seconds,
    );

    let store: Arc<dyn CredentialStore> = match &config.store {
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => Arc::new(
            PgSessionRepo::connect(database_url, *max_connections)
                .await
                .context("connecting to postgres")?,
        ),
        StoreBackend::Valkey { url, key_prefix } => Arc::new(
            ValkeyCredentialStore::connect(url, key_prefix.clone())
                .await
                .context("connecting to valkey")?,
        ),
    };

    tracing::info!(
        store = store.backend_name(),
        algorithms = ?verifier.policy().allowed(),
        "credential verification ready"
    );

    Ok(AppState::new(Arc::new(verifier), store))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::v1::routes(&state, &config.auth_issuer).with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
