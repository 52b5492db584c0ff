//! CLIインターフェース

use clap::{Args, Parser, Subcommand};

/// vaultrelay コマンドライン定義
#[derive(Debug, Parser)]
#[command(
    name = "vaultrelay",
    version,
    about = "Content-integrity-preserving file relay and vault monitor"
)]
pub struct Cli {
    /// サブコマンド（省略時はserve）
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// サブコマンド
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the relay server
    Serve(ServeArgs),
    /// Run one integrity check pass over every recorded vault entry
    Check,
}

/// serveサブコマンドの引数
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Bind address
    #[arg(long, env = "VAULTRELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Bind port
    #[arg(long, env = "VAULTRELAY_PORT", default_value_t = 5000)]
    pub port: u16,
}
