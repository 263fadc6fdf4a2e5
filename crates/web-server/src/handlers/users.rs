//! `/api/users`. Every response goes through `credentials::redact`.

use super::{DataResponse, MessageResponse};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::{error::AppError, AppState};
use axum::{extract::State, http::StatusCode, Json};
use core_types::{NewUser, NewUserRecord, Page, UserChanges, UserProfile, UserUpdate};
use credentials::{redact, CredentialError, CredentialManager};
use std::sync::Arc;

fn user_not_found() -> AppError {
    AppError::NotFound("Felhasználó nem található".to_string())
}

/// Runs a hashing job on the blocking pool so it does not stall the runtime.
async fn hash_off_runtime<T, F>(manager: &CredentialManager, job: F) -> Result<T, AppError>
where
    F: FnOnce(&CredentialManager) -> Result<T, CredentialError> + Send + 'static,
    T: Send + 'static,
{
    let manager = manager.clone();
    let result = tokio::task::spawn_blocking(move || job(&manager))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?;
    Ok(result?)
}

/// # GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AppQuery(page): AppQuery<Page>,
) -> Result<Json<DataResponse<Vec<UserProfile>>>, AppError> {
    let users = state.store.list_users(page).await?;
    Ok(Json(DataResponse::list(users.into_iter().map(redact).collect())))
}

/// # GET /api/users/:id
pub async fn get_user(
    AppPath(id): AppPath<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<UserProfile>>, AppError> {
    let user = state.store.find_user(id).await?.ok_or_else(user_not_found)?;
    Ok(Json(DataResponse::one(redact(user))))
}

/// # POST /api/users
/// Validation happens before hashing, and hashing before the single store write.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<NewUser>,
) -> Result<(StatusCode, Json<DataResponse<UserProfile>>), AppError> {
    let user = body.into_validated()?;

    let password = user.password;
    let credential = hash_off_runtime(&state.credentials, move |m| m.create(&password)).await?;

    let created = state
        .store
        .create_user(NewUserRecord {
            email: user.email,
            display_name: user.display_name,
            credential,
            avatar_url: user.avatar_url,
            permission_level: user.permission_level,
        })
        .await?;
    tracing::info!(user_id = created.id, "User created.");

    Ok((StatusCode::CREATED, Json(DataResponse::one(redact(created)))))
}

/// # PUT /api/users/:id
/// The credential is rotated only when the body carries a new password, and
/// the stored credential is not written otherwise.
pub async fn update_user(
    AppPath(id): AppPath<i32>,
    State(state): State<Arc<AppState>>,
    AppJson(update): AppJson<UserUpdate>,
) -> Result<Json<DataResponse<UserProfile>>, AppError> {
    update.validate()?;

    let credential = if update.password.is_some() {
        let job_update = update.clone();
        hash_off_runtime(&state.credentials, move |m| m.replacement(&job_update)).await?
    } else {
        None
    };
    let rotating = credential.is_some();

    let updated = state
        .store
        .update_user(id, UserChanges::new(update, credential))
        .await?
        .ok_or_else(user_not_found)?;
    tracing::info!(user_id = id, rotated_credential = rotating, "User updated.");

    Ok(Json(DataResponse::one(redact(updated))))
}

/// # DELETE /api/users/:id
pub async fn delete_user(
    AppPath(id): AppPath<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_user(id).await? {
        return Err(user_not_found());
    }
    tracing::info!(user_id = id, "User deleted.");
    Ok(Json(MessageResponse::new("Felhasználó sikeresen törölve")))
}
