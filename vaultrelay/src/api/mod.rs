//! REST APIハンドラー
//!
//! ルーティングとリクエストの展開だけを担い、意味論はすべて
//! ボールトリレーに委譲する。

use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::trace::TraceLayer;

/// APIエラーレスポンス型
pub mod error;

/// ファイル取り込みAPI
pub mod ingest;

/// ボールト照会API
pub mod vault;

/// APIルーターを作成
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;
    Router::new()
        .route("/", get(health_check))
        .route("/ingest", post(ingest::ingest_file))
        .route("/vault/:vault_id", get(vault::retrieve_file))
        .route("/vault/:vault_id/verify", get(vault::verify_file))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - ヘルスチェック
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "operational",
        "service": "vaultrelay",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}
