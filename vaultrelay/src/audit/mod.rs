//! 監査ログシステム
//!
//! 取り込み・取得イベントと検証結果を、それぞれ独立した追記専用の
//! JSONLログに記録する。ログはボールトの唯一の台帳であり、
//! 定期整合性チェックはここから作業対象を再構築する。

/// 追記専用JSONLイベントログ
pub mod log;

/// 監査レコードの型定義
pub mod types;

pub use log::EventLog;
