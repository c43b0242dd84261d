use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use message_relay::adapters::http::{build_router, middleware::ApiKey, HttpSettings};
use message_relay::adapters::{
    InMemoryMessageStore, InMemoryRateLimiter, PostgresMessageStore, SubscriptionRegistry,
};
use message_relay::application::SessionGateway;
use message_relay::config::{AppConfig, LogFormat, ServerConfig, StoreBackend};
use message_relay::domain::message::ContentPolicy;
use message_relay::ports::{MessageStore, ObserverRegistry, RateLimiter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);
    tracing::info!(
        environment = ?config.server.environment,
        store = ?config.relay.store,
        "Starting message relay"
    );

    let store = build_store(&config).await?;
    let registry: Arc<dyn ObserverRegistry> = Arc::new(SubscriptionRegistry::new());
    let policy = Arc::new(
        ContentPolicy::default().with_additional_terms(config.relay.extra_forbidden_terms_list()),
    );
    let gateway = Arc::new(SessionGateway::new(
        store,
        registry,
        policy,
        config.relay.observer_buffer,
    ));

    let submit_limiter = config.rate_limit.is_enabled().then(|| {
        Arc::new(InMemoryRateLimiter::per_minute(config.rate_limit.submit_per_minute))
            as Arc<dyn RateLimiter>
    });

    let app = build_router(
        gateway,
        HttpSettings {
            api_key: ApiKey::new(config.auth.api_key.clone()),
            submit_limiter,
            request_timeout: config.server.request_timeout(),
            cors_origins: config.server.cors_origins_list(),
        },
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match server.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn MessageStore>, Box<dyn std::error::Error>> {
    match config.relay.store {
        StoreBackend::Postgres => {
            let pool = config.database.connect().await?;
            let store = PostgresMessageStore::new(pool);
            if config.database.run_migrations {
                store.migrate().await?;
                tracing::info!("Database migrations applied");
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory message store; messages are lost on restart");
            Ok(Arc::new(InMemoryMessageStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
