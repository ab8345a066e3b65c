use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;
use service_core::extract::ValidatedJson;

use crate::{dtos::CreateUserRequest, models::User, AppState};

/// Register a learner. Duplicate usernames are rejected with 409.
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let new_user = payload.into_new_user();

    tracing::info!(username = %new_user.username, "Creating user");

    let user = state.db.create_user(&new_user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}
