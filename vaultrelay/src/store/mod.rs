//! オブジェクトストアアダプタ
//!
//! リモートバケットに対する put/get の薄い抽象。バックエンドは
//! HTTP（本番）、ファイルシステム（ローカル運用）、インメモリ（テスト）。

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// ファイルシステムバックエンド
pub mod fs;
/// HTTPバックエンド
pub mod http;
/// インメモリバックエンド
pub mod memory;

pub use fs::FsObjectStore;
pub use http::HttpObjectStore;
pub use memory::MemoryObjectStore;

/// Object store error type
#[derive(Debug, Error)]
pub enum StoreError {
    /// No object exists under the key
    #[error("object not found: {0}")]
    NotFound(String),

    /// Backend failure (network, I/O, unexpected status)
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value object store over a remote bucket.
///
/// Keys are opaque to the store; the relay derives them deterministically
/// from `(vault_id, filename)`. A `put` to an existing key overwrites it.
/// The relay never issues one because vault ids are write-once.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`.
    async fn put(&self, key: &str, bytes: Bytes) -> StoreResult<()>;

    /// Fetch the object stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Bytes>;
}
