use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use folio_core::{AppError, Identity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{AuthLoginRequest, CurrentUserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "user_id";

/// POST /auth/login - Verify credentials and attach the user to the session.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<CurrentUserResponse>> {
    let user = state
        .user_service
        .authenticate(&payload.username, &payload.password)
        .await?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;
    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    let identity = Identity::user(user.id);
    let groups = state.user_service.groups_for(&identity).await?;
    info!(user_id = %user.id, "user logged in");

    Ok(Json(CurrentUserResponse::new(identity, Some(user), groups)))
}

/// POST /auth/logout - Drop the session.
pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - Describe the caller and the groups it resolves to.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<CurrentUserResponse>> {
    let user = state.user_service.current_user(&identity).await?;
    let groups = state.user_service.groups_for(&identity).await?;

    Ok(Json(CurrentUserResponse::new(identity, user, groups)))
}
