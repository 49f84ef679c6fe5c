use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod datasets;
pub mod handlers;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/arquivo", get(handlers::arquivo_search))
        .route("/api/news", get(handlers::news_table))
        .route("/api/news/live", get(handlers::live_news))
        .route("/api/budget", get(handlers::budget))
        .route("/api/despesa", get(handlers::despesa))
        .route("/api/districts", get(handlers::districts))
        .route("/api/balance", get(handlers::balance))
        .route("/api/transfers", get(handlers::transfers))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::AppState;
    pub use ob_core::{Error, NewsArticle, RawArticle, Result};
}
