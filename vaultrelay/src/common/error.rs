//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! `VaultError`は`status_code()`と`external_message()`メソッドを提供し、
//! HTTPレスポンスへの変換を一箇所に集約する。

use axum::http::StatusCode;
use thiserror::Error;

/// Vault relay error type
#[derive(Debug, Error)]
pub enum VaultError {
    /// Missing or invalid input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown vault id, or the filename does not match a stored object
    #[error("Not found: {0}")]
    NotFound(String),

    /// Object store put/get failure (transient or permanent)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Hash mismatch or vanished object discovered during verification
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Audit log read/write failure
    #[error("Audit log error: {0}")]
    AuditLog(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Returns a safe error message for external clients.
    ///
    /// This method returns a generic message that does not expose internal
    /// detail such as store endpoints or log paths. Full error details are
    /// available via the `Display` implementation for server logs.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid request",
            Self::NotFound(_) => "Not found",
            Self::Storage(_) => "Storage backend error",
            Self::Integrity(_) => "Integrity violation",
            Self::AuditLog(_) => "Audit log error",
            Self::Internal(_) => "Internal server error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AuditLog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias
pub type VaultResult<T> = Result<T, VaultError>;
