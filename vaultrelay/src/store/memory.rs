//! インメモリオブジェクトストア（テスト用）

use super::{ObjectStore, StoreError, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// `HashMap`ベースのオブジェクトストア
///
/// テストでの使用を想定。`remove`で帯域外のオブジェクト消失を再現できる。
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryObjectStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// キーに対応するオブジェクトを削除し、存在したかを返す
    pub async fn remove(&self, key: &str) -> bool {
        self.objects.write().await.remove(key).is_some()
    }

    /// キーが存在するか
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// 保存されているオブジェクト数
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// ストアが空か
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Bytes) -> StoreResult<()> {
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}
