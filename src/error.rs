use std::fmt;

use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure reported by an external collaborator (account store, billing,
/// notification transport).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(String),
    #[error("http error: {0}")]
    Http(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Http(err.to_string())
    }
}

/// Steps of the account deletion workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionStep {
    LegacyCleanup,
    BillingCancellation,
    CoreDeletion,
    Notifying,
}

impl fmt::Display for DeletionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeletionStep::LegacyCleanup => "legacy_cleanup",
            DeletionStep::BillingCancellation => "billing_cancellation",
            DeletionStep::CoreDeletion => "core_deletion",
            DeletionStep::Notifying => "notifying",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: &'static str },
    #[error("token expired")]
    TokenExpired,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{step} failed for account {account_id}: {cause}")]
    Upstream {
        step: DeletionStep,
        account_id: i64,
        #[source]
        cause: StoreError,
    },
    #[error("{step} returned an unconfirmed result for account {account_id}")]
    Unconfirmed { step: DeletionStep, account_id: i64 },
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized(reason: &'static str) -> Self {
        AppError::Unauthorized { reason }
    }

    /// Short machine readable reason returned to clients.
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::Unauthorized { reason } => *reason,
            AppError::TokenExpired => "token_expired",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Upstream { .. } | AppError::Unconfirmed { .. } => "upstream_failure",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } | AppError::Unconfirmed { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error: &'static str,
    error_message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            code: status.as_u16() as i32,
            error: self.reason(),
            error_message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_names_step_and_account() {
        let err = AppError::Upstream {
            step: DeletionStep::LegacyCleanup,
            account_id: 42,
            cause: StoreError::Database("connection reset".into()),
        };
        assert_eq!(
            err.to_string(),
            "legacy_cleanup failed for account 42: database error: connection reset"
        );
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn expired_is_a_distinct_unauthorized_kind() {
        assert_eq!(AppError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TokenExpired.reason(), "token_expired");
        assert_eq!(AppError::unauthorized("invalid_token").reason(), "invalid_token");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
    }
}
