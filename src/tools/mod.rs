mod ffmpeg;
mod launch;

pub use ffmpeg::{FfProbe, FfmpegThumbnailer};
pub use launch::{parse_command, spawn_detached};

use std::path::Path;
use async_trait::async_trait;
use crate::error::Result;
use crate::media::ProbeOutput;

/// 動画から1フレームを切り出す依頼
#[derive(Debug, Clone, Copy)]
pub struct FrameRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    /// 出力サイズ(px)
    pub size: u32,
    /// 再生位置（%）
    pub percent: u32,
}

/// 動画サムネイル生成ツール
#[async_trait]
pub trait VideoThumbnailer: Send + Sync {
    async fn extract_frame(&self, request: FrameRequest<'_>) -> Result<()>;
}

/// メディア情報取得ツール
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, input: &Path) -> Result<ProbeOutput>;
}
