use std::sync::Arc;

use axum::{
    Router,
    http::HeaderName,
    routing::{delete, get},
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use auth::{AccountStore, IdentityResolver, JwtValidator};
use cache::IdentityCache;
use config::Config;
use deletion::AccountDeleter;

pub mod auth;
pub mod cache;
pub mod config;
pub mod deletion;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub validator: Arc<JwtValidator>,
    pub identity_cache: Arc<dyn IdentityCache>,
    pub resolver: Arc<IdentityResolver>,
    pub accounts: Arc<dyn AccountStore>,
    pub deleter: Arc<AccountDeleter>,
}

/// Builds the HTTP application. Everything under the base URI requires a
/// valid UP access token; `/admin` additionally requires an admin account.
pub fn app(state: AppState) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    let admin_routes = Router::new()
        .route("/admin/users", get(routes::admin::list_users))
        .route("/admin/user/delete", delete(routes::admin::delete_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ));

    let protected_routes = Router::new()
        .route("/users/me", get(routes::user::me))
        .merge(admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .nest(&state.config.api_base_uri, protected_routes)
        .layer(axum::middleware::from_fn(middleware::log_errors))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}
