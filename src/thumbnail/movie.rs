use futures::future::join_all;
use tracing::{info, warn};
use crate::fs_utils::{check_access, ensure_directory};
use crate::media::MediaRecord;
use crate::state::AppState;
use crate::thumbnail::{seek_percent, ThumbnailOptions};
use crate::tools::FrameRequest;

/// 動画から index ごとに1枚ずつ切り出す。
/// 全 index を並行に実行し、全て終わるまで待つ（失敗はログのみ）
pub async fn create_thumbnails(
    record: &MediaRecord,
    state: &AppState,
    options: ThumbnailOptions,
    force: bool,
) {
    ensure_directory(&record.thumbnail_dir(&state.cache)).await;
    if !force && record.has_all_thumbnails(&state.cache, options.count).await {
        return;
    }

    info!("サムネイル生成: {}", record.fullpath.display());

    let tasks = (1..=options.count).map(|index| async move {
        let output = record.thumbnail_path(&state.cache, index);
        if !force && check_access(&output).await {
            return;
        }

        let request = FrameRequest {
            input: &record.fullpath,
            output: &output,
            size: options.size,
            percent: seek_percent(options.count, index),
        };
        if let Err(e) = state.thumbnailer.extract_frame(request).await {
            warn!("{} [{}]: {}", record.fullpath.display(), index, e);
        }
    });

    join_all(tasks).await;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tempfile::TempDir;
    use crate::database::Database;
    use crate::media::MediaRecord;
    use crate::test_support::{test_state, CountingThumbnailer, StaticProber};
    use crate::thumbnail::ThumbnailOptions;

    const OPTIONS: ThumbnailOptions = ThumbnailOptions { count: 3, size: 160 };

    async fn movie(dir: &TempDir) -> MediaRecord {
        let path = dir.path().join("videos").join("clip.mkv");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not really a video").unwrap();
        MediaRecord::build_by_path(&path).await.unwrap()
    }

    fn state_with(dir: &TempDir, thumbnailer: Arc<CountingThumbnailer>) -> crate::state::AppState {
        test_state(
            dir,
            Arc::new(Database::open_in_memory().unwrap()),
            thumbnailer,
            Arc::new(StaticProber::new(None)),
        )
    }

    #[tokio::test]
    async fn creates_every_thumbnail_with_spread_positions() {
        let dir = TempDir::new().unwrap();
        let thumbnailer = Arc::new(CountingThumbnailer::default());
        let state = state_with(&dir, thumbnailer.clone());
        let record = movie(&dir).await;

        record.create_thumbnail(&state, OPTIONS, false).await;

        assert_eq!(thumbnailer.calls(), 3);
        assert!(record.has_all_thumbnails(&state.cache, 3).await);
        let percents: Vec<u32> = thumbnailer.requests().into_iter().map(|(_, p)| p).collect();
        assert_eq!(percents, vec![33, 50, 99]);
    }

    #[tokio::test]
    async fn second_run_skips_existing_thumbnails() {
        let dir = TempDir::new().unwrap();
        let thumbnailer = Arc::new(CountingThumbnailer::default());
        let state = state_with(&dir, thumbnailer.clone());
        let record = movie(&dir).await;

        record.create_thumbnail(&state, OPTIONS, false).await;
        record.create_thumbnail(&state, OPTIONS, false).await;
        assert_eq!(thumbnailer.calls(), 3);
    }

    #[tokio::test]
    async fn only_missing_indices_are_regenerated() {
        let dir = TempDir::new().unwrap();
        let thumbnailer = Arc::new(CountingThumbnailer::default());
        let state = state_with(&dir, thumbnailer.clone());
        let record = movie(&dir).await;

        record.create_thumbnail(&state, OPTIONS, false).await;
        std::fs::remove_file(record.thumbnail_path(&state.cache, 2)).unwrap();
        record.create_thumbnail(&state, OPTIONS, false).await;

        assert_eq!(thumbnailer.calls(), 4);
        assert!(record.has_all_thumbnails(&state.cache, 3).await);
    }

    #[tokio::test]
    async fn force_regenerates_every_index() {
        let dir = TempDir::new().unwrap();
        let thumbnailer = Arc::new(CountingThumbnailer::default());
        let state = state_with(&dir, thumbnailer.clone());
        let record = movie(&dir).await;

        record.create_thumbnail(&state, OPTIONS, false).await;
        record.create_thumbnail(&state, OPTIONS, true).await;
        assert_eq!(thumbnailer.calls(), 6);
    }

    #[tokio::test]
    async fn tool_failures_do_not_abort_the_batch() {
        let dir = TempDir::new().unwrap();
        let thumbnailer = Arc::new(CountingThumbnailer::failing());
        let state = state_with(&dir, thumbnailer.clone());
        let record = movie(&dir).await;

        record.create_thumbnail(&state, OPTIONS, false).await;

        assert_eq!(thumbnailer.calls(), 3);
        assert!(!record.has_all_thumbnails(&state.cache, 3).await);
        assert!(record.thumbnail_dir(&state.cache).is_dir());
    }
}
