//! ボールトエントリとログ再生
//!
//! 永続化された台帳は取り込みログのみ。現在の状態は取り込み成功
//! レコードの再生で再構築する（vault_idごとにlast-write-wins）。

use crate::audit::types::{AuditRecord, Operation, RecordStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// ボールト内の1ファイルの論理エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEntry {
    /// ボールトID（取り込み時に一度だけ割り当て）
    pub vault_id: Uuid,
    /// ファイル名（無害化済み、一意性は保証しない）
    pub filename: String,
    /// 取り込み時のSHA-256ハッシュ（以後の検証の基準値）
    pub content_hash: String,
    /// 取り込み時のサイズ（バイト）
    pub size_bytes: u64,
    /// 取り込み時刻
    pub ingested_at: DateTime<Utc>,
}

impl VaultEntry {
    fn from_record(record: &AuditRecord) -> Option<Self> {
        if record.operation != Operation::Ingest || record.status != RecordStatus::Success {
            return None;
        }
        let content_hash = record.sha256_hash.clone()?;
        Some(Self {
            vault_id: record.vault_id,
            filename: record.filename.clone(),
            content_hash,
            size_bytes: record.size_bytes.unwrap_or(0),
            ingested_at: record.timestamp,
        })
    }
}

/// 取り込みログから現在のエントリ集合を再構築する
///
/// 同一vault_idの取り込み成功レコードが複数あれば最新が勝つ。
/// 返り値の順序は初出順。
pub fn live_entries(records: &[AuditRecord]) -> Vec<VaultEntry> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut entries: Vec<VaultEntry> = Vec::new();
    for record in records {
        if let Some(entry) = VaultEntry::from_record(record) {
            match index.get(&entry.vault_id) {
                Some(&position) => entries[position] = entry,
                None => {
                    index.insert(entry.vault_id, entries.len());
                    entries.push(entry);
                }
            }
        }
    }
    entries
}

/// `(vault_id, filename)`に一致する最新の取り込みエントリを探す
pub fn find_entry(records: &[AuditRecord], vault_id: Uuid, filename: &str) -> Option<VaultEntry> {
    records.iter().rev().find_map(|record| {
        let entry = VaultEntry::from_record(record)?;
        (entry.vault_id == vault_id && entry.filename == filename).then_some(entry)
    })
}

/// `vault_id`の最新の取り込みエントリを探す（メタデータ照会用）
pub fn find_by_id(records: &[AuditRecord], vault_id: Uuid) -> Option<VaultEntry> {
    records.iter().rev().find_map(|record| {
        let entry = VaultEntry::from_record(record)?;
        (entry.vault_id == vault_id).then_some(entry)
    })
}
