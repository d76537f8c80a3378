use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Recommendation, UserId},
    routes::{AppState, TopKQuery},
};

#[derive(Debug, Serialize)]
pub struct UserRecommendations {
    pub user_id: UserId,
    pub recommendations: Vec<Recommendation>,
}

/// Handler for personalised recommendations.
///
/// Users outside the rating matrix get a 404; there is no fallback here.
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
    Query(params): Query<TopKQuery>,
) -> AppResult<Json<UserRecommendations>> {
    let top_k = params.top_k.unwrap_or(state.default_top_k);

    let recommendations = match state.recommender().recommend_for_user(user_id, top_k) {
        Ok(recommendations) => recommendations,
        Err(e) => {
            tracing::info!(request_id = %request_id, user_id, error = %e, "No user recommendations");
            return Err(e);
        }
    };

    tracing::info!(
        request_id = %request_id,
        user_id,
        top_k,
        returned = recommendations.len(),
        "User recommendations served"
    );

    Ok(Json(UserRecommendations {
        user_id,
        recommendations,
    }))
}
