use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{Game, ItemId, Recommendation},
    routes::{AppState, TopKQuery},
};

/// A game together with the games most similar to it
#[derive(Debug, Serialize)]
pub struct GameRecommendations {
    pub game: Game,
    /// Empty when the game has no entry in the similarity index
    pub recommendations: Vec<Recommendation>,
}

/// Handler listing every game, ordered by name
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Game>> {
    Json(state.catalog.sorted_by_name())
}

/// Handler for a single game and its similar games
pub async fn show(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(app_id): Path<ItemId>,
    Query(params): Query<TopKQuery>,
) -> AppResult<Json<GameRecommendations>> {
    let game = state
        .catalog
        .game(app_id)
        .ok_or_else(|| AppError::NotFound(format!("Game {} not found", app_id)))?;

    let top_k = params.top_k.unwrap_or(state.default_top_k);
    let recommendations = state.recommender().recommend_similar_items(app_id, top_k);

    tracing::info!(
        request_id = %request_id,
        app_id,
        top_k,
        returned = recommendations.len(),
        "Similar games served"
    );

    Ok(Json(GameRecommendations {
        game,
        recommendations,
    }))
}
