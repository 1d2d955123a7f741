mod app;
mod config;
mod error;
mod gate;
mod panorama;
mod store;
mod web_ui;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::AppState;
use config::Config;
use store::SheetStore;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panoview=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()
        .expect("ADMIN_PASSWORD and MASTER_KEY must be set in the environment");

    tracing::info!("Token sheet at {:?}", config.sheet_path);

    let store = Arc::new(SheetStore::new(config.sheet_path.clone()));
    let state = Arc::new(AppState::new(config, store));

    let app = web_ui::router()
        .with_state(state.clone())
        // Room for three full-size equirectangular images per upload
        .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!(
        "{}:{}",
        state.config.server_host, state.config.server_port
    )
    .parse()
    .expect("Invalid SERVER_HOST/SERVER_PORT");

    tracing::info!("360° photo access server listening on http://{}", addr);
    tracing::info!("Viewer login at /, admin panel at /admin");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
