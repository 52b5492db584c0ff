//! 追記専用JSONLイベントログ
//!
//! 1レコード=1行。書き込みはミューテックスで直列化し、1レコードが
//! 途中で混ざらないことを保証する。読み出しは記録順の再生。

use crate::common::error::{VaultError, VaultResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// 追記専用のイベントログ
///
/// ファイルにバックされたJSONLストア。`append`は1レコードを1行として
/// 完結した形で書き込む。
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl EventLog {
    /// 指定パスのログを開く（ファイルは最初の追記時に作成される）
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// ログファイルのパス
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// レコードを1行として追記する
    pub async fn append<T: Serialize>(&self, record: &T) -> VaultResult<()> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| VaultError::AuditLog(format!("serialize record: {e}")))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| VaultError::AuditLog(format!("open {}: {}", self.path.display(), e)))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| VaultError::AuditLog(format!("write {}: {}", self.path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| VaultError::AuditLog(format!("flush {}: {}", self.path.display(), e)))?;
        Ok(())
    }

    /// ログ全体を記録順に再生する
    ///
    /// ログファイルが未作成なら空。解釈できない行は警告を出して読み飛ばす
    /// （1行の破損が履歴全体を道連れにしないため）。
    pub async fn replay<T: DeserializeOwned>(&self) -> VaultResult<Vec<T>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(VaultError::AuditLog(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        line = index + 1,
                        "Skipping malformed log line: {}",
                        e
                    );
                }
            }
        }
        Ok(records)
    }

    /// 末尾`keep`行だけを残してログを切り詰め、削除した行数を返す
    pub async fn trim_to_last(&self, keep: usize) -> VaultResult<usize> {
        let _guard = self.write_lock.lock().await;
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(VaultError::AuditLog(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let lines: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() <= keep {
            return Ok(0);
        }
        let dropped = lines.len() - keep;
        let mut remaining = lines[dropped..].join("\n");
        remaining.push('\n');

        // 一時ファイル経由で差し替え、途中失敗で元ログが欠けないようにする
        let tmp_path = self.path.with_extension("jsonl.tmp");
        tokio::fs::write(&tmp_path, remaining)
            .await
            .map_err(|e| VaultError::AuditLog(format!("write {}: {}", tmp_path.display(), e)))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| VaultError::AuditLog(format!("rename {}: {}", tmp_path.display(), e)))?;
        Ok(dropped)
    }
}
