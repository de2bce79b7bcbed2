use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use folio_core::{AppError, Identity, UserId};
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;

/// Resolves the caller identity from the session. Requests without a session
/// user continue as [`Identity::Anonymous`].
pub async fn resolve_identity(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserId>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(Identity::user)
        .unwrap_or_default();

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
