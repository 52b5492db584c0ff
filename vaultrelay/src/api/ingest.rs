//! ファイル取り込みAPI (/ingest)

use super::error::AppError;
use crate::common::error::VaultError;
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// 取り込みレスポンス
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// 処理結果（常に`success`）
    pub status: String,
    /// 割り当てたボールトID
    pub vault_id: Uuid,
    /// 保存に使用したファイル名
    pub filename: String,
    /// 保存したバイト列のSHA-256ハッシュ
    pub sha256_hash: String,
    /// 保存サイズ（バイト）
    pub file_size: u64,
    /// 取り込み時刻
    pub timestamp: DateTime<Utc>,
}

/// POST /ingest - ファイルをボールトへ取り込む
///
/// multipart/form-dataの`file`フィールドを受け取り、取得用のvault_idを返す。
pub async fn ingest_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, AppError> {
    let mut file_data: Option<Bytes> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError(VaultError::Validation(format!(
            "failed to parse multipart form: {e}"
        )))
    })? {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            file_name = field.file_name().map(|s| s.to_string());
            let bytes = field.bytes().await.map_err(|e| {
                AppError(VaultError::Validation(format!(
                    "failed to read file field: {e}"
                )))
            })?;
            file_data = Some(bytes);
        }
        // 未知のフィールドは無視
    }

    let data =
        file_data.ok_or_else(|| AppError(VaultError::Validation("no file provided".to_string())))?;
    let filename = file_name.unwrap_or_default();
    if filename.is_empty() {
        return Err(AppError(VaultError::Validation(
            "no file selected".to_string(),
        )));
    }

    let receipt = state.relay.ingest(&filename, data).await?;

    Ok(Json(IngestResponse {
        status: "success".to_string(),
        vault_id: receipt.vault_id,
        filename: receipt.filename,
        sha256_hash: receipt.content_hash,
        file_size: receipt.size_bytes,
        timestamp: receipt.timestamp,
    }))
}
