use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use village_migration::MigratorTrait;

mod api;
mod config;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "village_server=info,tower_http=info".into()),
        )
        .init();

    let config = config::ServerConfig::from_env();

    // Database connection
    let db_config = village_db::DatabaseConfig::from_env();
    tracing::info!("connecting to database...");
    let db = village_db::connect(&db_config)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("running database migrations...");
    village_migration::Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    tracing::info!("migrations complete");

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("failed to create upload directory");
    let storage = Arc::new(village_media::LocalStorage::new(config.upload_dir.clone()));
    tracing::info!(path = %config.upload_dir.display(), "using local image storage");

    let state = Arc::new(village_db::AppState { db, storage });
    let app = api::router(state, &config);

    let addr = config.bind_addr();
    tracing::info!(%addr, "server started, API docs at /api");

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .expect("failed to bind listener"),
        app,
    )
    .await
    .expect("server error");
}
