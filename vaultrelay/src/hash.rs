//! SHA-256ダイジェストエンジン
//!
//! 取り込み時と検証時に同一のバイト列から同一のダイジェストを導出する。
//! チャンク分割の仕方に依存せず、入力バイト列のみで結果が決まる。

use sha2::{Digest, Sha256};

/// SHA-256の16進表現の長さ
pub const DIGEST_HEX_LEN: usize = 64;

/// ダイジェスト結果（16進ハッシュと入力サイズ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDigest {
    /// 小文字16進のSHA-256ハッシュ（64文字）
    pub hex: String,
    /// ダイジェストした総バイト数
    pub size_bytes: u64,
}

/// ストリーミングSHA-256ハッシャー
///
/// 入力を任意のチャンクで`update`し、`finish`で確定する。
#[derive(Default)]
pub struct Sha256Stream {
    hasher: Sha256,
    size_bytes: u64,
}

impl Sha256Stream {
    /// 新しいハッシャーを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// チャンクを取り込む
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.size_bytes += chunk.len() as u64;
    }

    /// ダイジェストを確定する
    pub fn finish(self) -> ContentDigest {
        ContentDigest {
            hex: format!("{:x}", self.hasher.finalize()),
            size_bytes: self.size_bytes,
        }
    }
}

/// バイト列全体のダイジェストを計算
pub fn digest(data: &[u8]) -> ContentDigest {
    let mut stream = Sha256Stream::new();
    for chunk in data.chunks(64 * 1024) {
        stream.update(chunk);
    }
    stream.finish()
}

/// バイト列全体の16進ハッシュを計算
pub fn sha256_hex(data: &[u8]) -> String {
    digest(data).hex
}
