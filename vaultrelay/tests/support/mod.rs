//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use vaultrelay::api;
use vaultrelay::audit::EventLog;
use vaultrelay::store::MemoryObjectStore;
use vaultrelay::vault::VaultRelay;
use vaultrelay::AppState;

/// A relay server bound to an ephemeral port, backed by an in-memory
/// object store and tempdir-backed logs.
pub struct TestVault {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryObjectStore>,
    pub vault_log: Arc<EventLog>,
    pub integrity_log: Arc<EventLog>,
    _logs_dir: tempfile::TempDir,
}

pub async fn spawn_vault() -> TestVault {
    let logs_dir = tempfile::tempdir().expect("failed to create temp dir");
    let vault_log = Arc::new(EventLog::new(logs_dir.path().join("vault_log.jsonl")));
    let integrity_log = Arc::new(EventLog::new(logs_dir.path().join("integrity_log.jsonl")));
    let store = Arc::new(MemoryObjectStore::new());
    let relay = VaultRelay::new(store.clone(), vault_log.clone(), integrity_log.clone());

    let state = AppState {
        relay,
        max_upload_bytes: 100 * 1024 * 1024,
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server error");
    });

    TestVault {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        store,
        vault_log,
        integrity_log,
        _logs_dir: logs_dir,
    }
}

impl TestVault {
    /// POST /ingest with a multipart `file` field.
    pub async fn ingest_response(&self, filename: &str, bytes: &[u8]) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        self.client
            .post(format!("{}/ingest", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("ingest request failed")
    }

    /// Ingest and return the parsed success response.
    pub async fn ingest(&self, filename: &str, bytes: &[u8]) -> serde_json::Value {
        let response = self.ingest_response(filename, bytes).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("ingest response is not JSON")
    }

    /// GET /vault/{vault_id}?filename=...
    pub async fn retrieve_response(&self, vault_id: &str, filename: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/vault/{}", self.base_url, vault_id))
            .query(&[("filename", filename)])
            .send()
            .await
            .expect("retrieve request failed")
    }

    /// GET /vault/{vault_id}/verify?filename=...
    pub async fn verify_response(&self, vault_id: &str, filename: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/vault/{}/verify", self.base_url, vault_id))
            .query(&[("filename", filename)])
            .send()
            .await
            .expect("verify request failed")
    }
}
