use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use tic_tac_toe_arena::app_state::AppState;
use tic_tac_toe_arena::ws_socket::ws_handler;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // The owner identity is fixed for the lifetime of the registry. Supply
    // OWNER_ID to control it, otherwise a fresh one is minted and logged.
    let owner = match env::var("OWNER_ID").ok().map(|raw| raw.parse::<Uuid>()) {
        Some(Ok(owner)) => owner,
        Some(Err(e)) => {
            error!("❌ OWNER_ID is not a valid UUID: {}", e);
            return;
        }
        None => {
            let owner = Uuid::new_v4();
            info!("🔑 No OWNER_ID set, minted registry owner {}", owner);
            owner
        }
    };

    let (tx, _) = broadcast::channel(500);
    let app_state = Arc::new(AppState::new(owner, tx));

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::clone(&app_state));

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Failed to bind to {}: {}", addr, e);
            return;
        }
    };

    match listener.local_addr() {
        Ok(local) => info!("Server is running on {}", local),
        Err(_) => info!("Server is running on {}", addr),
    }

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("❌ Server error: {}", e);
    }
}
