use pet_lover_server::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{self, MongoRepository, RepositoryState},
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, installs logging, connects the shared MongoDB client, and
/// serves the router until the process is stopped.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise a development-friendly default.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pet_lover_server=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database: one client for the whole process.
    let client = repository::connect(&config.mongo_uri)
        .await
        .expect("FATAL: Invalid MongoDB connection settings. Check MONGODB_URI or DB_USER/DB_PASS.");
    let mongo = MongoRepository::new(client, &config.db_name);

    // The driver connects lazily, so an unreachable cluster is reported but not fatal.
    match mongo.ping().await {
        Ok(()) => tracing::info!("Pinged your deployment. Connected to MongoDB."),
        Err(e) => tracing::warn!(error = %e, "MongoDB ping failed; continuing"),
    }

    let repo = Arc::new(mongo) as RepositoryState;

    // 4. State, router, server.
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = create_router(AppState { repo, config });

    let listener = TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: Could not bind {addr}: {e}"));

    tracing::info!("Pet Lover Server is running on port {}", addr.port());
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server terminated");
    }
}
