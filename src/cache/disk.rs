use std::path::{Component, Path, PathBuf};

// サムネイルキャッシュディレクトリ（元ファイルのパス構成をミラーする）
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    pub cache_dir: PathBuf,
}

impl ThumbnailCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into() }
    }

    /// 元ファイルのパスをキャッシュ配下に写像する。
    /// 絶対パスのルートやドライブ指定は取り除いて連結する
    pub fn mirror(&self, source: &Path) -> PathBuf {
        let mut mirrored = self.cache_dir.clone();
        for component in source.components() {
            match component {
                Component::Prefix(prefix) => {
                    let drive = prefix.as_os_str().to_string_lossy().replace([':', '\\', '?'], "");
                    if !drive.is_empty() {
                        mirrored.push(drive);
                    }
                }
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir => {
                    mirrored.push("..");
                }
                Component::Normal(part) => mirrored.push(part),
            }
        }
        mirrored
    }

    /// ファイルのサムネイルを置くディレクトリ
    pub fn dir_for(&self, source: &Path) -> PathBuf {
        let mirrored = self.mirror(source);
        mirrored
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(mirrored)
    }
}
