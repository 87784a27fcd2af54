use tracing::Span;

/// Logging context tag carried by every deletion log line.
pub const DELETION_LOG_CONTEXT: &str = "account_deletion";

/// Per-call state of one account deletion. Lives for a single request.
#[derive(Debug, Clone)]
pub struct DeletionContext {
    pub account_id: i64,
    pub admin_id: i64,
    pub username: String,
    pub request_id: String,
    span: Span,
}

impl DeletionContext {
    pub fn new(account_id: i64, admin_id: i64, username: String, request_id: String) -> Self {
        let span = tracing::info_span!(
            "account_deletion",
            user_id = account_id,
            admin_id,
            user_email = %username,
            req_id = %request_id,
            req_ctx = DELETION_LOG_CONTEXT,
        );
        Self {
            account_id,
            admin_id,
            username,
            request_id,
            span,
        }
    }

    /// Span every collaborator call runs in.
    pub fn span(&self) -> &Span {
        &self.span
    }
}
