//! Vault Relay Server
//!
//! ファイルをオブジェクトストアへ退避し、取り込み時のSHA-256ハッシュを
//! 追記専用ログに台帳として残すことで、保存後もバイト列が不変であることを
//! 証明できる中継サーバー

#![warn(missing_docs)]

/// 共通型定義
pub mod common;

/// REST APIハンドラー
pub mod api;

/// SHA-256ダイジェストエンジン
pub mod hash;

/// オブジェクトストアアダプタ
pub mod store;

/// 監査ログシステム（取り込みログ・検証ログ）
pub mod audit;

/// ボールトリレー（取り込み・取得・検証）
pub mod vault;

/// 定期整合性チェック
pub mod monitor;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// CLIインターフェース
pub mod cli;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// ボールトリレー
    pub relay: vault::VaultRelay,
    /// アップロードサイズ上限（バイト）
    pub max_upload_bytes: usize,
}
