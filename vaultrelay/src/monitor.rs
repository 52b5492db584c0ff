//! 定期整合性チェック
//!
//! 取り込みログを再生して現存エントリを列挙し、1件ずつストアと照合して
//! 検証ログに結果を追記する。外部スケジューラから起動される1パス実行で、
//! パス間に状態を持たない。何度実行しても安全。

use crate::audit::types::VerificationRecord;
use crate::audit::EventLog;
use crate::common::error::VaultResult;
use crate::store::ObjectStore;
use crate::vault::{self, CheckOutcome};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// 1パスの集計結果
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// 対象エントリ数
    pub total: usize,
    /// 検証成功数
    pub verified: usize,
    /// 破損検出数（オブジェクト消失含む）
    pub corrupted: usize,
    /// 検証不能数（ストア到達不能等）
    pub errors: usize,
    /// 所要時間
    pub duration: Duration,
}

/// 整合性モニター
pub struct IntegrityMonitor {
    store: Arc<dyn ObjectStore>,
    vault_log: Arc<EventLog>,
    integrity_log: Arc<EventLog>,
    retention: usize,
}

impl IntegrityMonitor {
    /// 新しいモニターを作成
    ///
    /// `retention`は1パス終了時に検証ログへ残すレコード数（0で無効）。
    pub fn new(
        store: Arc<dyn ObjectStore>,
        vault_log: Arc<EventLog>,
        integrity_log: Arc<EventLog>,
        retention: usize,
    ) -> Self {
        Self {
            store,
            vault_log,
            integrity_log,
            retention,
        }
    }

    /// 整合性チェックを1パス実行する
    ///
    /// 個々のエントリの失敗でパス全体は止めない。結果はエントリごとに
    /// 検証ログへ追記し、最後に集計レコードを書く。
    pub async fn run_once(&self) -> VaultResult<RunSummary> {
        let started = std::time::Instant::now();
        info!("Starting integrity check");

        let records = self.vault_log.replay().await?;
        let entries = vault::live_entries(&records);
        info!("Checking integrity of {} files", entries.len());

        let mut verified = 0usize;
        let mut corrupted = 0usize;
        let mut errors = 0usize;

        for entry in &entries {
            let outcome = vault::check_entry(self.store.as_ref(), entry).await;
            let record = vault::verification_record(entry, &outcome, Utc::now());
            if let Err(e) = self.integrity_log.append(&record).await {
                warn!("Failed to append verification record: {}", e);
            }

            match outcome {
                CheckOutcome::Verified { .. } => {
                    verified += 1;
                    info!(
                        vault_id = %entry.vault_id,
                        filename = %entry.filename,
                        "Integrity verified"
                    );
                }
                CheckOutcome::Corrupted { .. } => {
                    corrupted += 1;
                    error!(
                        vault_id = %entry.vault_id,
                        filename = %entry.filename,
                        "Integrity check failed: hash mismatch"
                    );
                }
                CheckOutcome::Missing => {
                    corrupted += 1;
                    error!(
                        vault_id = %entry.vault_id,
                        filename = %entry.filename,
                        "Integrity check failed: object missing from store"
                    );
                }
                CheckOutcome::Error(e) => {
                    errors += 1;
                    error!(
                        vault_id = %entry.vault_id,
                        filename = %entry.filename,
                        "Integrity check error: {}",
                        e
                    );
                }
            }
        }

        let duration = started.elapsed();
        let summary = RunSummary {
            total: entries.len(),
            verified,
            corrupted,
            errors,
            duration,
        };

        let summary_record = VerificationRecord::IntegritySummary {
            timestamp: Utc::now(),
            total_files: summary.total,
            verified_files: summary.verified,
            corrupted_files: summary.corrupted,
            error_files: summary.errors,
            check_duration_seconds: duration.as_secs_f64(),
            status: "completed".to_string(),
        };
        if let Err(e) = self.integrity_log.append(&summary_record).await {
            warn!("Failed to append summary record: {}", e);
        }

        if self.retention > 0 {
            match self.integrity_log.trim_to_last(self.retention).await {
                Ok(0) => {}
                Ok(dropped) => info!("Trimmed {} old verification records", dropped),
                Err(e) => warn!("Failed to trim verification log: {}", e),
            }
        }

        info!(
            total = summary.total,
            verified = summary.verified,
            corrupted = summary.corrupted,
            errors = summary.errors,
            duration_ms = duration.as_millis() as u64,
            "Integrity check completed"
        );
        if summary.corrupted > 0 {
            warn!("{} files failed integrity check", summary.corrupted);
        }

        Ok(summary)
    }
}
