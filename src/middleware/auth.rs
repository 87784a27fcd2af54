use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    auth::AuthContext,
    cache::cached_identity,
    error::AppError,
};

/// Authenticates a UP access token and attaches the resolved [`AuthContext`]
/// to the request. Nothing is attached unless every step succeeds.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let raw_token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned);

    let Some(raw_token) = raw_token else {
        tracing::info!("missing authorization header");
        return Err(AppError::unauthorized("missing_authorization"));
    };

    let username = cached_identity(state.identity_cache.as_ref(), &raw_token, |token| {
        state.validator.preferred_username(token).map_err(|e| {
            tracing::info!("token validation failed: {}", e);
            AppError::from(e)
        })
    })
    .await?;

    let resolved = state.resolver.resolve(&username).await.map_err(|e| {
        tracing::warn!("account resolution failed: {}", e);
        match e {
            AppError::NotFound(_) => AppError::unauthorized("unknown_account"),
            _ => AppError::unauthorized("account_lookup_failed"),
        }
    })?;

    tracing::info!(account_id = resolved.account_id, "authenticated UP user");
    req.extensions_mut().insert(AuthContext::from(resolved));
    Ok(next.run(req).await)
}

/// Must run after [`auth_middleware`].
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = req
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| AppError::unauthorized("missing_authorization"))?;

    if !state.config.is_admin(ctx.account_id) {
        tracing::warn!(account_id = ctx.account_id, "non-admin called admin endpoint");
        return Err(AppError::Forbidden("admin access required".into()));
    }
    Ok(next.run(req).await)
}
