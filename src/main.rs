use std::sync::Arc;

use followup::{AppState, app, auth::AuthKeys, db, relay::Relay};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("followup=info")),
        )
        .init();

    let database_url =
        dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_owned());
    let db_pool = db::connect(&database_url).await?;
    db::init(&db_pool).await?;

    let secret = dotenv::var("JWT_SECRET").unwrap_or_else(|_| "followup-dev-secret".to_owned());
    let state = AppState {
        db_pool,
        auth_keys: AuthKeys::new(&secret),
        relay: Arc::new(Relay::new()),
    };

    let addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
