use std::path::{Path, PathBuf};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use crate::constants::CATALOG_CONCURRENCY;
use crate::error::Result;
use crate::media::MediaRecord;
use crate::state::AppState;
use crate::thumbnail::ThumbnailOptions;

/// DB にあればそのレコード、なければファイルから作る。
/// パスは正規化して照合する（存在しないパスはそのまま）
pub async fn find_record(state: &AppState, path: &Path) -> Result<MediaRecord> {
    let path = tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf());
    let fullpath = path.to_string_lossy().to_string();
    let row = state
        .with_store(move |store| store.find_by_fullpath(&fullpath))
        .await?;
    match row {
        Some(row) => Ok(MediaRecord::from_row(row)),
        None => MediaRecord::build_by_path(&path).await,
    }
}

// 1件分: 未保存なら保存し、サムネイルを揃える
async fn sync_one(state: &AppState, path: PathBuf, options: ThumbnailOptions) -> Option<MediaRecord> {
    let record = match find_record(state, &path).await {
        Ok(record) => record,
        Err(e) => {
            warn!("ファイル情報取得失敗: {} - {}", path.display(), e);
            return None;
        }
    };
    let record = if record.id.is_none() {
        record.save(state).await
    } else {
        record
    };
    record.create_thumbnail(state, options, false).await;
    Some(record)
}

/// ファイル群をライブラリに登録してサムネイルを生成する。
/// 同時に処理するのは CATALOG_CONCURRENCY 件まで
pub async fn sync_library(state: &AppState, paths: Vec<PathBuf>) -> Vec<MediaRecord> {
    let options = ThumbnailOptions::from(&state.config.thumbnail);
    let total = paths.len();

    let records: Vec<MediaRecord> = stream::iter(paths)
        .map(|path| sync_one(state, path, options))
        .buffer_unordered(CATALOG_CONCURRENCY)
        .filter_map(|record| async move { record })
        .collect()
        .await;

    info!("ライブラリ同期: {}/{} 件", records.len(), total);
    records
}

/// 保存済みレコード一覧
pub async fn list_files(state: &AppState, favorites_only: bool) -> Result<Vec<MediaRecord>> {
    let rows = state.with_store(|store| store.all()).await?;
    Ok(rows
        .into_iter()
        .map(MediaRecord::from_row)
        .filter(|r| !favorites_only || r.favorited)
        .collect())
}

/// 1ファイルのサムネイルを生成
pub async fn ensure_thumbnails(state: &AppState, path: &Path, force: bool) -> Result<MediaRecord> {
    let record = find_record(state, path).await?;
    let options = ThumbnailOptions::from(&state.config.thumbnail);
    record.create_thumbnail(state, options, force).await;
    Ok(record)
}

/// お気に入りを切り替える（未保存なら先に保存）
pub async fn toggle_favorite(state: &AppState, path: &Path) -> Result<MediaRecord> {
    let record = find_record(state, path).await?;
    let record = if record.id.is_none() {
        record.try_save(state).await?
    } else {
        record
    };
    Ok(record.toggle_favorite(state).await)
}
