use std::path::Path;
use tokio::fs;
use tracing::warn;

// パスにアクセスできるか確認（エラーは false として扱う）
pub async fn check_access(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

// ディレクトリを再帰的に作成（既に存在する場合も true）
pub async fn ensure_directory(path: &Path) -> bool {
    match fs::create_dir_all(path).await {
        Ok(()) => true,
        Err(e) => {
            warn!("ディレクトリ作成失敗: {} - {}", path.display(), e);
            false
        }
    }
}
