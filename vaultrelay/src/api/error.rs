//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::VaultError;
use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub VaultError);

impl From<VaultError> for AppError {
    fn from(err: VaultError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        // Full error detail goes to server logs only; clients get the
        // external message.
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        let payload = json!({
            "error": self.0.external_message()
        });
        (status, Json(payload)).into_response()
    }
}
