//! HTTPオブジェクトストア
//!
//! リモートバケットを `{endpoint}/{bucket}/{key}` のキー/バリュー
//! ゲートウェイとして扱う。認証はオプションのbearerトークン。
//! タイムアウトは共有クライアント側で設定する。

use super::{ObjectStore, StoreError, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;

/// リモートHTTPバケットに対するオブジェクトストア
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl HttpObjectStore {
    /// 新しいストアクライアントを作成
    ///
    /// `client`は接続プーリングとタイムアウト設定済みの共有クライアント。
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            token,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: Bytes) -> StoreResult<()> {
        let url = self.object_url(key);
        let response = self
            .authorize(self.client.put(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("PUT {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(StoreError::Backend(format!(
                "PUT {} returned {}",
                url,
                response.status()
            )));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let url = self.object_url(key);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("GET {}: {}", url, e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(key.to_string()));
        }
        if !response.status().is_success() {
            return Err(StoreError::Backend(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }
        response
            .bytes()
            .await
            .map_err(|e| StoreError::Backend(format!("GET {} body: {}", url, e)))
    }
}
