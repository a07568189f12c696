use std::sync::Arc;
use crate::cache::ThumbnailCache;
use crate::config::Config;
use crate::database::FileStore;
use crate::error::Result;
use crate::tools::{FfProbe, FfmpegThumbnailer, MediaProber, VideoThumbnailer};

// アプリケーション状態（設定・DB・外部ツールをまとめて各操作に渡す）
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: ThumbnailCache,
    pub store: Arc<dyn FileStore>,
    pub thumbnailer: Arc<dyn VideoThumbnailer>,
    pub prober: Arc<dyn MediaProber>,
}

impl AppState {
    /// 設定に書かれた外部ツールを使う
    pub fn new(config: Config, store: Arc<dyn FileStore>) -> Self {
        let thumbnailer = Arc::new(FfmpegThumbnailer::new(config.tools.thumbnailer.clone()));
        let prober = Arc::new(FfProbe::new(config.tools.probe.clone()));
        Self::with_tools(config, store, thumbnailer, prober)
    }

    pub fn with_tools(
        config: Config,
        store: Arc<dyn FileStore>,
        thumbnailer: Arc<dyn VideoThumbnailer>,
        prober: Arc<dyn MediaProber>,
    ) -> Self {
        let cache = ThumbnailCache::new(config.thumbnail.dir.clone());
        Self {
            config: Arc::new(config),
            cache,
            store,
            thumbnailer,
            prober,
        }
    }

    /// ブロッキングの DB 操作を専用スレッドで実行
    pub async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn FileStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref())).await?
    }
}
