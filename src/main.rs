//! Showroom back-office backend
//!
//! Serves the dealership's resources over REST with SQLite persistence.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use showroom::config::Config;
use showroom::db::{self, Repository};
use showroom::resources::ResourceRegistry;
use showroom::uploads::UploadStore;
use showroom::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting showroom back-office");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Upload directory: {:?}", config.upload_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (SHOWROOM_API_PSK). Writes are unauthenticated!");
    }

    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let uploads = Arc::new(UploadStore::new(&config.upload_dir));

    let resources = ResourceRegistry::builtin().with_page_size(config.page_size);
    tracing::info!("Serving {} resources", resources.len());

    let state = AppState {
        repo,
        resources: Arc::new(resources),
        uploads,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
