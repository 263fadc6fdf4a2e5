use super::{DataResponse, MessageResponse};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::{error::AppError, AppState};
use axum::{extract::State, http::StatusCode, Json};
use core_types::{Anime, AnimeChanges, AnimeFilter, NewAnime};
use std::sync::Arc;

fn anime_not_found() -> AppError {
    AppError::NotFound("Anime nem található".to_string())
}

/// # GET /api/animes
/// Query params: `?genre=Action&status=Ongoing&search=naruto&limit=50&offset=0`
pub async fn list_animes(
    State(state): State<Arc<AppState>>,
    AppQuery(filter): AppQuery<AnimeFilter>,
) -> Result<Json<DataResponse<Vec<Anime>>>, AppError> {
    let animes = state.store.list_animes(&filter).await?;
    Ok(Json(DataResponse::list(animes)))
}

/// # GET /api/animes/:id
pub async fn get_anime(
    AppPath(id): AppPath<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Anime>>, AppError> {
    let anime = state.store.find_anime(id).await?.ok_or_else(anime_not_found)?;
    Ok(Json(DataResponse::one(anime)))
}

/// # POST /api/animes
pub async fn create_anime(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<NewAnime>,
) -> Result<(StatusCode, Json<DataResponse<Anime>>), AppError> {
    let title = body.validated_title()?;
    let created = state
        .store
        .create_anime(NewAnime {
            title: Some(title),
            ..body
        })
        .await?;
    tracing::info!(anime_id = created.id, "Anime created.");
    Ok((StatusCode::CREATED, Json(DataResponse::one(created))))
}

/// # PUT /api/animes/:id
pub async fn update_anime(
    AppPath(id): AppPath<i32>,
    State(state): State<Arc<AppState>>,
    AppJson(changes): AppJson<AnimeChanges>,
) -> Result<Json<DataResponse<Anime>>, AppError> {
    let changes = changes.validated()?;
    let updated = state
        .store
        .update_anime(id, changes)
        .await?
        .ok_or_else(anime_not_found)?;
    Ok(Json(DataResponse::one(updated)))
}

/// # DELETE /api/animes/:id
pub async fn delete_anime(
    AppPath(id): AppPath<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_anime(id).await? {
        return Err(anime_not_found());
    }
    tracing::info!(anime_id = id, "Anime deleted.");
    Ok(Json(MessageResponse::new("Anime sikeresen törölve")))
}
