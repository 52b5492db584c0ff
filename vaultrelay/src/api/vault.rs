//! ボールト照会API (/vault/{vault_id})
//!
//! ファイル取得・メタデータ照会・オンデマンド検証

use super::error::AppError;
use crate::common::error::VaultError;
use crate::vault::{sanitize_filename, VerifyReport};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 取得クエリパラメータ
#[derive(Debug, Deserialize)]
pub struct RetrieveParams {
    /// 取得対象のファイル名
    pub filename: Option<String>,
    /// trueならファイル本体ではなく取り込みメタデータを返す
    pub metadata_only: Option<bool>,
}

/// 検証クエリパラメータ
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    /// 検証対象のファイル名
    pub filename: Option<String>,
}

/// メタデータレスポンス
#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    /// ボールトID
    pub vault_id: Uuid,
    /// ファイル名
    pub filename: String,
    /// 取り込み時のSHA-256ハッシュ
    pub sha256_hash: String,
    /// 取り込み時のサイズ（バイト）
    pub file_size: u64,
    /// 取り込み時刻
    pub timestamp: DateTime<Utc>,
    /// 取り込みレコードのステータス
    pub status: String,
}

fn parse_vault_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| {
        AppError(VaultError::Validation(format!(
            "invalid vault id format: {raw}"
        )))
    })
}

fn required_filename(filename: Option<&str>, purpose: &str) -> Result<String, AppError> {
    match filename {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(AppError(VaultError::Validation(format!(
            "filename required for {purpose}"
        )))),
    }
}

/// GET /vault/{vault_id} - ファイル取得（またはメタデータ照会）
pub async fn retrieve_file(
    State(state): State<AppState>,
    Path(vault_id): Path<String>,
    Query(params): Query<RetrieveParams>,
) -> Result<Response, AppError> {
    let vault_id = parse_vault_id(&vault_id)?;

    if params.metadata_only.unwrap_or(false) {
        let entry = state.relay.metadata(vault_id).await?;
        return Ok(Json(MetadataResponse {
            vault_id: entry.vault_id,
            filename: entry.filename,
            sha256_hash: entry.content_hash,
            file_size: entry.size_bytes,
            timestamp: entry.ingested_at,
            status: "success".to_string(),
        })
        .into_response());
    }

    let filename = required_filename(params.filename.as_deref(), "file retrieval")?;
    let bytes = state.relay.retrieve(vault_id, &filename).await?;

    let disposition = format!("attachment; filename=\"{}\"", sanitize_filename(&filename));
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// GET /vault/{vault_id}/verify - 保存済みファイルの完全性検証
pub async fn verify_file(
    State(state): State<AppState>,
    Path(vault_id): Path<String>,
    Query(params): Query<VerifyParams>,
) -> Result<Json<VerifyReport>, AppError> {
    let vault_id = parse_vault_id(&vault_id)?;
    let filename = required_filename(params.filename.as_deref(), "verification")?;
    let report = state.relay.verify(vault_id, &filename).await?;
    Ok(Json(report))
}
