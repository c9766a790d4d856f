//! Process entry point: configuration, store startup, and serving.

use std::process;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use chat_relay::adapters::gateway::{Gateway, GatewayConfig};
use chat_relay::adapters::http::ApiRouter;
use chat_relay::adapters::postgres::PostgresChatStore;
use chat_relay::adapters::websocket::{websocket_router, Relay, RelayState, RoomRegistry};
use chat_relay::config::AppConfig;

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.server.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = config.validate() {
        tracing::error!(error = %err, "invalid configuration");
        process::exit(1);
    }

    let pool = match PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            // The relay cannot start without its durable store.
            tracing::error!(error = %err, "database connection failed");
            process::exit(1);
        }
    };
    tracing::info!("database connection established");

    if config.database.run_migrations {
        if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
            tracing::error!(error = %err, "database migration failed");
            process::exit(1);
        }
        tracing::info!("database migrations applied");
    }

    let store = Arc::new(PostgresChatStore::new(pool));
    let registry = Arc::new(RoomRegistry::new());
    let relay = Arc::new(Relay::new(registry.clone(), store.clone()));

    let api = Arc::new(ApiRouter::new(store, relay.clone()));
    let gateway = Gateway::new(
        api,
        GatewayConfig {
            client_origin: config.server.client_origin.clone(),
            base_url: config.server.base_url(),
        },
    );

    let app = Router::new()
        .merge(websocket_router().with_state(RelayState::new(registry, relay)))
        .fallback_service(gateway)
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "failed to bind listener");
            process::exit(1);
        }
    };
    tracing::info!(%addr, "server listening");

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server terminated");
        process::exit(1);
    }
}
