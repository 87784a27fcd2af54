use axum::{
    extract::{Extension, Json, Query, State, rejection::QueryRejection},
    http::HeaderMap,
};

use crate::{AppState, auth::AuthContext, deletion::DeletionReceipt, error::AppError};

use super::model::{DeleteUserQuery, ListUsersQuery, ListUsersResponse};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<ListUsersResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let until = chrono::Utc::now().timestamp_micros();
    let users = state
        .accounts
        .list_since(query.since_time, until)
        .await
        .map_err(|e| AppError::Internal(format!("listing accounts failed: {e}")))?;

    Ok(Json(ListUsersResponse { users }))
}

#[axum::debug_handler]
pub async fn delete_user(
    Extension(admin): Extension<AuthContext>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DeleteUserQuery>,
) -> Result<Json<DeletionReceipt>, AppError> {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    // Once started, the deletion runs to completion even if the client goes away.
    let deleter = state.deleter.clone();
    let task = tokio::spawn(async move {
        deleter
            .delete_account(admin.account_id, &query.username, &request_id)
            .await
    });

    let receipt = task
        .await
        .map_err(|e| AppError::Internal(format!("deletion task failed: {e}")))??;
    Ok(Json(receipt))
}
