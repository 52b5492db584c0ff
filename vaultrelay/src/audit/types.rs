//! 監査レコードの型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 操作種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// ファイル取り込み
    Ingest,
    /// ファイル取得
    Retrieve,
}

impl Operation {
    /// 操作種別を文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Retrieve => "retrieve",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 記録ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// 操作成功
    Success,
    /// 操作失敗
    Error,
}

/// 取り込み・取得ログのレコード
///
/// 1イベント1レコード。取り込み成功レコードのハッシュが以後の検証の
/// 基準値（ground truth）になる。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// タイムスタンプ
    pub timestamp: DateTime<Utc>,
    /// 操作種別
    pub operation: Operation,
    /// ボールトID
    pub vault_id: Uuid,
    /// ファイル名（無害化済み）
    pub filename: String,
    /// コンテンツのSHA-256ハッシュ（取得時は再計算しないため省略）
    pub sha256_hash: Option<String>,
    /// コンテンツサイズ（バイト）
    pub size_bytes: Option<u64>,
    /// 記録ステータス
    pub status: RecordStatus,
    /// エラー内容（失敗時）
    pub error: Option<String>,
}

impl AuditRecord {
    /// 取り込み成功レコードを作成
    pub fn ingest_success(
        vault_id: Uuid,
        filename: &str,
        sha256_hash: &str,
        size_bytes: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            operation: Operation::Ingest,
            vault_id,
            filename: filename.to_string(),
            sha256_hash: Some(sha256_hash.to_string()),
            size_bytes: Some(size_bytes),
            status: RecordStatus::Success,
            error: None,
        }
    }

    /// 取り込み失敗レコードを作成（ダイジェストとサイズは計算済み）
    pub fn ingest_error(
        vault_id: Uuid,
        filename: &str,
        sha256_hash: &str,
        size_bytes: u64,
        timestamp: DateTime<Utc>,
        error: &str,
    ) -> Self {
        Self {
            timestamp,
            operation: Operation::Ingest,
            vault_id,
            filename: filename.to_string(),
            sha256_hash: Some(sha256_hash.to_string()),
            size_bytes: Some(size_bytes),
            status: RecordStatus::Error,
            error: Some(error.to_string()),
        }
    }

    /// 取得成功レコードを作成
    pub fn retrieve_success(vault_id: Uuid, filename: &str, size_bytes: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Retrieve,
            vault_id,
            filename: filename.to_string(),
            sha256_hash: None,
            size_bytes: Some(size_bytes),
            status: RecordStatus::Success,
            error: None,
        }
    }

    /// 取得失敗レコードを作成
    pub fn retrieve_error(vault_id: Uuid, filename: &str, error: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Retrieve,
            vault_id,
            filename: filename.to_string(),
            sha256_hash: None,
            size_bytes: None,
            status: RecordStatus::Error,
            error: Some(error.to_string()),
        }
    }
}

/// 検証ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// ハッシュ一致
    Verified,
    /// ハッシュ不一致、またはオブジェクト消失
    Corrupted,
    /// 検証自体が実行できなかった（ストア到達不能等）
    Error,
}

impl VerificationStatus {
    /// 検証ステータスを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Corrupted => "corrupted",
            Self::Error => "error",
        }
    }
}

/// 検証ログのレコード
///
/// `check_type`でタグ付けされた2種類のレコードが同一ログに並ぶ。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "check_type", rename_all = "snake_case")]
pub enum VerificationRecord {
    /// 個別エントリの検証結果
    IntegrityVerification {
        /// タイムスタンプ
        timestamp: DateTime<Utc>,
        /// ボールトID
        vault_id: Uuid,
        /// ファイル名
        filename: String,
        /// 検証ステータス
        status: VerificationStatus,
        /// 取り込み時に記録されたハッシュ
        original_hash: String,
        /// 再計算したハッシュ（オブジェクト消失時は無し）
        current_hash: Option<String>,
        /// ハッシュ一致判定（検証未遂時は無し）
        integrity_verified: Option<bool>,
        /// エラー内容
        error: Option<String>,
    },
    /// 1回のチェックパスの集計
    IntegritySummary {
        /// タイムスタンプ
        timestamp: DateTime<Utc>,
        /// 対象エントリ数
        total_files: usize,
        /// 検証成功数
        verified_files: usize,
        /// 破損検出数（消失含む）
        corrupted_files: usize,
        /// 検証不能数
        error_files: usize,
        /// パスの所要秒数
        check_duration_seconds: f64,
        /// パスの完了ステータス
        status: String,
    },
    /// チェックパス自体が実行できなかった
    FatalError {
        /// タイムスタンプ
        timestamp: DateTime<Utc>,
        /// エラー内容
        error: String,
        /// パスの完了ステータス（常に`failed`）
        status: String,
    },
}
