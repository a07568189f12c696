pub mod archive;
pub mod movie;

use serde::{Deserialize, Serialize};
use crate::config::ThumbnailConfig;
use crate::constants::MAX_SEEK_PERCENT;

/// サムネイル生成の指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailOptions {
    /// 1ファイルあたりの枚数
    pub count: u32,
    /// 出力幅(px)
    pub size: u32,
}

impl From<&ThumbnailConfig> for ThumbnailOptions {
    fn from(config: &ThumbnailConfig) -> Self {
        Self {
            count: config.count,
            size: config.size,
        }
    }
}

/// index 番目（1 始まり）のサムネイルを切り出す再生位置（%）。
/// 後ろの index ほど先に進み、99% を超えない
pub fn seek_percent(count: u32, index: u32) -> u32 {
    let remaining = count.saturating_add(1).saturating_sub(index).max(1);
    (100.0 / remaining as f64).min(MAX_SEEK_PERCENT).round() as u32
}
