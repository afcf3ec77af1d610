use thiserror::Error;

/// Top-level application error. Only `InvalidRequest` ever reaches the caller
/// in descriptive form; everything else is logged server-side and surfaced as
/// an opaque 500.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Caller errors ────────────────────────────────────────────────────────
    #[error("{message}")]
    InvalidRequest { message: String },

    // ── Upstream errors ──────────────────────────────────────────────────────
    #[error("OAuth token exchange failed ({status}): {body}")]
    UpstreamAuth { status: u16, body: String },

    #[error("Case creation failed ({status}): {body}")]
    UpstreamSubmission { status: u16, body: String },

    // ── Token store errors ───────────────────────────────────────────────────
    #[error("Token store write failed: {message}")]
    ConfigWrite { message: String },

    #[error("Token store read failed: {message}")]
    ConfigRead { message: String },

    // ── Transport errors ─────────────────────────────────────────────────────
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        AppError::InvalidRequest { message: message.into() }
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, AppError::InvalidRequest { .. })
    }
}
