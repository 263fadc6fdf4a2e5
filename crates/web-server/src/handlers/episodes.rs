use super::DataResponse;
use crate::extract::AppPath;
use crate::{error::AppError, AppState};
use axum::{extract::State, Json};
use core_types::Episode;
use std::sync::Arc;

/// # GET /api/episodes/anime/:anime_id
/// Episodes in play order with their sources. An anime without episodes is a 404.
pub async fn episodes_for_anime(
    AppPath(anime_id): AppPath<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<Episode>>>, AppError> {
    let episodes = state.store.episodes_for_anime(anime_id).await?;
    if episodes.is_empty() {
        return Err(AppError::NotFound(
            "Nem található részek ehhez az animéhez".to_string(),
        ));
    }
    Ok(Json(DataResponse::list(episodes)))
}
