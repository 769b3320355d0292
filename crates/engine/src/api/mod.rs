//! API layer - HTTP and WebSocket entry points.

pub mod connections;
pub mod http;
pub mod websocket;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use connections::ConnectionRegistry;

use crate::app::App;
use websocket::{ws_handler, WsState};

/// Full router: REST routes plus the `/ws` endpoint.
pub fn router(app: Arc<App>) -> Router {
    let ws_state = Arc::new(WsState { app: app.clone() });

    http::routes()
        .with_state(app)
        .route("/ws", get(ws_handler).with_state(ws_state))
        .layer(TraceLayer::new_for_http())
}
