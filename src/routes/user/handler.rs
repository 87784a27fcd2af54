use axum::extract::{Extension, Json};

use crate::auth::AuthContext;

use super::model::MeResponse;

pub async fn me(Extension(ctx): Extension<AuthContext>) -> Json<MeResponse> {
    Json(MeResponse {
        account_id: ctx.account_id,
        username: ctx.username,
    })
}
