use axum::{Router, middleware::from_fn, routing::get};
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passgate_axum::{PASSGATE_ROUTE_PREFIX, passgate_router, refresh_session};

mod handlers;
mod server;

use crate::{
    handlers::{index, protected},
    server::spawn_http_server,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug,passgate=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Fails fast when GOOGLE_ID or GOOGLE_SECRET is missing
    passgate_axum::init().await?;

    let app = Router::new()
        .route("/", get(index))
        .route("/protected", get(protected))
        .nest(PASSGATE_ROUTE_PREFIX.as_str(), passgate_router())
        .layer(from_fn(refresh_session));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    spawn_http_server(port, app).await??;
    Ok(())
}
