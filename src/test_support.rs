use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use tempfile::TempDir;
use crate::config::Config;
use crate::database::{FileRow, FileStore, NewFile};
use crate::error::{MediaError, Result};
use crate::media::ProbeOutput;
use crate::state::AppState;
use crate::tools::{FrameRequest, MediaProber, VideoThumbnailer};

/// 呼び出しを記録し、出力先に小さなファイルを書く
#[derive(Default)]
pub struct CountingThumbnailer {
    calls: AtomicUsize,
    requests: Mutex<Vec<(PathBuf, u32)>>,
    fail: bool,
}

impl CountingThumbnailer {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (出力パス, %) を出力パス順で返す
    pub fn requests(&self) -> Vec<(PathBuf, u32)> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort();
        requests
    }
}

#[async_trait]
impl VideoThumbnailer for CountingThumbnailer {
    async fn extract_frame(&self, request: FrameRequest<'_>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((request.output.to_path_buf(), request.percent));
        if self.fail {
            return Err(MediaError::Tool {
                program: "fake-thumbnailer".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "broken".to_string(),
            });
        }
        tokio::fs::write(request.output, b"png").await?;
        Ok(())
    }
}

/// 固定の結果を返す（None なら失敗）
pub struct StaticProber {
    output: Option<ProbeOutput>,
    calls: AtomicUsize,
}

impl StaticProber {
    pub fn new(output: Option<ProbeOutput>) -> Self {
        Self { output, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProber for StaticProber {
    async fn probe(&self, input: &Path) -> Result<ProbeOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output.clone().ok_or_else(|| MediaError::Tool {
            program: "fake-probe".to_string(),
            status: "exit status: 1".to_string(),
            stderr: format!("cannot probe {}", input.display()),
        })
    }
}

/// 常に失敗するストア
pub struct FailingStore;

fn offline() -> MediaError {
    MediaError::Io(io::Error::new(io::ErrorKind::Other, "store offline"))
}

impl FileStore for FailingStore {
    fn add(&self, _file: &NewFile) -> Result<i64> {
        Err(offline())
    }
    fn get(&self, _id: i64) -> Result<Option<FileRow>> {
        Err(offline())
    }
    fn find_by_fullpath(&self, _fullpath: &str) -> Result<Option<FileRow>> {
        Err(offline())
    }
    fn set_favorited(&self, _id: i64, _favorited: bool) -> Result<usize> {
        Err(offline())
    }
    fn all(&self) -> Result<Vec<FileRow>> {
        Err(offline())
    }
}

/// 一時ディレクトリ配下にサムネイルを置く状態
pub fn test_state(
    dir: &TempDir,
    store: Arc<dyn FileStore>,
    thumbnailer: Arc<dyn VideoThumbnailer>,
    prober: Arc<dyn MediaProber>,
) -> AppState {
    let mut config = Config::default();
    config.thumbnail.dir = dir.path().join("thumbnails");
    config.database = dir.path().join("library.db");
    AppState::with_tools(config, store, thumbnailer, prober)
}
