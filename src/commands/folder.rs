use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;
use crate::constants::{ARCHIVE_EXTENSIONS, MOVIE_EXTENSIONS};

// カタログ対象の拡張子か
pub fn is_supported(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    MOVIE_EXTENSIONS.contains(&ext.as_str()) || ARCHIVE_EXTENSIONS.contains(&ext.as_str())
}

/// フォルダ以下を再帰的に走査し、対象ファイルを自然順で返す
pub fn get_folder_contents(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();

    for entry_result in WalkDir::new(folder).follow_links(true) {
        // ディレクトリエントリ読み込みエラーはログ出力して続行
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                warn!("ディレクトリエントリ読み込みエラー: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_supported(entry.path()) {
            continue;
        }
        // 保存済みレコードと照合できるよう正規化
        let path = entry.into_path();
        files.push(fs::canonicalize(&path).unwrap_or(path));
    }

    // パスで自然順ソート
    files.sort_by(|a, b| natord::compare(&a.to_string_lossy(), &b.to_string_lossy()));
    files
}
