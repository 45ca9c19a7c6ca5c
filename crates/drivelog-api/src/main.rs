use anyhow::{Context, Result};
use drivelog_core::{IdCodec, TokenCache};
use std::env;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod handlers;
mod routes;
mod state;

const DEV_SECRET: &str = "drivelog-dev-secret";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "drivelog_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Get configuration
    let port = env::var("API_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()?;

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let secret = env::var("DRIVELOG_SECRET").unwrap_or_else(|_| {
        tracing::warn!("No DRIVELOG_SECRET provided, using development fallback");
        DEV_SECRET.to_string()
    });

    // Initialize database
    let db = drivelog_db::Database::new(&database_url).await?;
    db.init_schema().await?;

    // Create app state
    let state = state::AppState {
        db: Arc::new(db),
        codec: Arc::new(IdCodec::new(&secret)),
        tokens: TokenCache::new(),
    };

    // Build router
    let app = routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("DriveLog API server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
