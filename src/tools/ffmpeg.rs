use std::path::Path;
use std::process::Output;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use crate::error::{MediaError, Result};
use crate::media::ProbeOutput;
use crate::tools::{FrameRequest, MediaProber, VideoThumbnailer};

// 終了ステータスを確認してエラーに変換
fn check_output(program: &str, output: Output) -> Result<Output> {
    if output.status.success() {
        return Ok(output);
    }
    Err(MediaError::Tool {
        program: program.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// ffmpegthumbnailer を呼び出す
pub struct FfmpegThumbnailer {
    program: String,
}

impl FfmpegThumbnailer {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

#[async_trait]
impl VideoThumbnailer for FfmpegThumbnailer {
    async fn extract_frame(&self, request: FrameRequest<'_>) -> Result<()> {
        debug!(
            "{}: {} -> {} ({}%)",
            self.program,
            request.input.display(),
            request.output.display(),
            request.percent
        );
        let output = Command::new(&self.program)
            .arg("-i")
            .arg(request.input)
            .arg("-o")
            .arg(request.output)
            .arg("-s")
            .arg(request.size.to_string())
            .arg("-t")
            .arg(format!("{}%", request.percent))
            .output()
            .await?;
        check_output(&self.program, output)?;
        Ok(())
    }
}

/// ffprobe を JSON 出力モードで呼び出す
pub struct FfProbe {
    program: String,
}

impl FfProbe {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

#[async_trait]
impl MediaProber for FfProbe {
    async fn probe(&self, input: &Path) -> Result<ProbeOutput> {
        let output = Command::new(&self.program)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(input)
            .output()
            .await?;
        let output = check_output(&self.program, output)?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
