use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    data::InteractionStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    models::ItemCatalog,
    services::{ItemModel, Recommender},
};

pub mod games;
pub mod users;

/// Read-only state shared by all handlers.
///
/// Model and catalog are built once at startup. Serving new data means
/// building a new `AppState`, never patching this one.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ItemModel>,
    pub catalog: Arc<ItemCatalog>,
    /// List length used when a request does not pass `top_k`
    pub default_top_k: usize,
}

impl AppState {
    pub fn new(model: ItemModel, catalog: ItemCatalog, default_top_k: usize) -> Self {
        Self {
            model: Arc::new(model),
            catalog: Arc::new(catalog),
            default_top_k,
        }
    }

    /// Fits the model on the full store
    pub fn from_store(store: &InteractionStore, default_top_k: usize) -> Self {
        let model = ItemModel::fit(store.interactions());
        Self::new(model, store.catalog().clone(), default_top_k)
    }

    pub fn recommender(&self) -> Recommender<'_> {
        Recommender::new(&self.model, &self.catalog)
    }
}

/// Optional `?top_k=` query parameter
#[derive(Debug, Deserialize)]
pub struct TopKQuery {
    pub top_k: Option<usize>,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(Arc::new(state))
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/games", get(games::list))
        .route("/games/:app_id", get(games::show))
        .route("/users/:user_id/recommendations", get(users::recommendations))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
