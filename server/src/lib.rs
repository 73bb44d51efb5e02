//! Library surface of the hub binary, split out so integration tests (and
//! `main.rs`) can drive `Hub` and the wire protocol directly instead of
//! reaching into the binary's own internals.

pub mod config;
pub mod error;
pub mod hub;
pub mod logging;
pub mod protocol;
pub mod ws;

pub fn build_router(hub: std::sync::Arc<hub::Hub>) -> axum::Router {
    use axum::routing::get;
    use tower_http::cors::CorsLayer;

    axum::Router::new()
        .route("/ws", get(ws::websocket_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .with_state(hub)
}
