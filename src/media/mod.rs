mod info;

pub use info::{ProbeFormat, ProbeOutput, ProbeStream, ProbeValue};

use std::collections::BTreeMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use crate::cache::ThumbnailCache;
use crate::config::Config;
use crate::constants::MOVIE_EXTENSIONS;
use crate::database::{FileRow, MediaColumns, NewFile};
use crate::error::{MediaError, Result};
use crate::fs_utils::check_access;
use crate::state::AppState;
use crate::thumbnail::{self, ThumbnailOptions};
use crate::tools;

/// ファイル種別。拡張子で決まり、サムネイル生成方法を切り替える
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Archive,
}

impl MediaKind {
    /// 動画拡張子に含まれなければアーカイブとして扱う
    pub fn from_basename(basename: &str) -> Self {
        let ext = extension_of(basename).to_lowercase();
        if MOVIE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Movie
        } else {
            MediaKind::Archive
        }
    }
}

fn extension_of(basename: &str) -> &str {
    Path::new(basename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

// inode の変更時刻（Unix 以外は作成・更新時刻）
fn change_time(metadata: &Metadata) -> DateTime<Utc> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let Some(t) = DateTime::from_timestamp(metadata.ctime(), metadata.ctime_nsec() as u32) {
            return t;
        }
    }
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// メディアファイル1件。変更は新しい値を返す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    /// 保存前は None
    pub id: Option<i64>,
    pub basename: String,
    pub fullpath: PathBuf,
    pub filesize: i64,
    pub ctime: DateTime<Utc>,
    pub media: MediaColumns,
    pub thumbnail_version: i64,
    pub favorited: bool,
    kind: MediaKind,
}

impl MediaRecord {
    /// 未保存のレコードを作る
    pub fn build(data: NewFile) -> Self {
        let kind = MediaKind::from_basename(&data.basename);
        Self {
            id: None,
            basename: data.basename,
            fullpath: PathBuf::from(data.fullpath),
            filesize: data.filesize,
            ctime: data.ctime,
            media: data.media,
            thumbnail_version: 0,
            favorited: false,
            kind,
        }
    }

    /// DB の行からレコードを復元
    pub fn from_row(row: FileRow) -> Self {
        let kind = MediaKind::from_basename(&row.basename);
        Self {
            id: Some(row.id),
            basename: row.basename,
            fullpath: PathBuf::from(row.fullpath),
            filesize: row.filesize,
            ctime: row.ctime,
            media: row.media,
            thumbnail_version: row.thumbnail_version,
            favorited: row.favorited,
            kind,
        }
    }

    /// ファイルを stat してレコードを作る
    pub async fn build_by_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let basename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Self::build(NewFile {
            basename,
            fullpath: path.to_string_lossy().to_string(),
            filesize: metadata.len() as i64,
            ctime: change_time(&metadata),
            media: MediaColumns::default(),
        }))
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_movie(&self) -> bool {
        self.kind == MediaKind::Movie
    }

    pub fn extname(&self) -> &str {
        extension_of(&self.basename)
    }

    pub fn basename_without_extension(&self) -> &str {
        Path::new(&self.basename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.basename)
    }

    /// "幅x高さ"（動画のみ）
    pub fn resolution(&self) -> Option<String> {
        if !self.is_movie() {
            return None;
        }
        let fmt = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string());
        Some(format!("{}x{}", fmt(self.media.width), fmt(self.media.height)))
    }

    /// "H:MM:SS"（動画のみ、長さ不明なら "NaN"）
    pub fn duration_str(&self) -> Option<String> {
        if !self.is_movie() {
            return None;
        }
        let Some(duration) = self.media.duration else {
            return Some("NaN".to_string());
        };
        let hour = duration / 3600;
        let min = (duration - hour * 3600) / 60;
        let sec = (duration - hour * 3600 - min * 60) % 60;
        Some(format!("{}:{:02}:{:02}", hour, min, sec))
    }

    pub fn with_favorited(&self, favorited: bool) -> Self {
        Self { favorited, ..self.clone() }
    }

    pub fn exists(&self) -> bool {
        self.fullpath.exists()
    }

    // ---------- サムネイル ----------

    pub fn thumbnail_dir(&self, cache: &ThumbnailCache) -> PathBuf {
        cache.dir_for(&self.fullpath)
    }

    /// index は 1 始まり
    pub fn thumbnail_path(&self, cache: &ThumbnailCache, index: u32) -> PathBuf {
        self.thumbnail_dir(cache)
            .join(format!("{}_{}.png", self.basename_without_extension(), index))
    }

    pub fn thumbnails(&self, cache: &ThumbnailCache, count: u32) -> Vec<PathBuf> {
        (1..=count).map(|i| self.thumbnail_path(cache, i)).collect()
    }

    /// 1..=count の全サムネイルが存在するか
    pub async fn has_all_thumbnails(&self, cache: &ThumbnailCache, count: u32) -> bool {
        let mut all_present = true;
        for i in 1..=count {
            all_present &= check_access(&self.thumbnail_path(cache, i)).await;
        }
        all_present
    }

    /// 不足しているサムネイルを生成する（force なら全て作り直す）。
    /// 失敗は個別にログ出力して続行する
    pub async fn create_thumbnail(&self, state: &AppState, options: ThumbnailOptions, force: bool) {
        match self.kind {
            MediaKind::Movie => thumbnail::movie::create_thumbnails(self, state, options, force).await,
            MediaKind::Archive => thumbnail::archive::create_thumbnails(self, state, options, force).await,
        }
    }

    // ---------- 外部コマンド ----------

    pub fn main_command(&self, config: &Config) -> String {
        config.get_command(self.extname())
    }

    pub fn commands(&self, config: &Config) -> BTreeMap<String, String> {
        config.get_all_commands(self.extname())
    }

    fn command_template(&self, config: &Config, command_name: Option<&str>) -> Result<String> {
        match command_name {
            None => Ok(self.main_command(config)),
            Some(name) => self
                .commands(config)
                .remove(name)
                .ok_or_else(|| MediaError::UnknownCommand(format!("{} ({})", name, self.extname()))),
        }
    }

    /// 既定または名前付きのコマンドでファイルを開く。起動後は関知しない
    pub fn execute(&self, config: &Config, command_name: Option<&str>) -> bool {
        let launched = self
            .command_template(config, command_name)
            .and_then(|template| tools::spawn_detached(&template, &self.fullpath));
        match launched {
            Ok(()) => true,
            Err(e) => {
                warn!("コマンド起動失敗: {} - {}", self.fullpath.display(), e);
                false
            }
        }
    }

    // ---------- メディア情報 ----------

    /// ffprobe の結果（動画以外・失敗時は None）
    pub async fn get_media_info(&self, state: &AppState) -> Option<ProbeOutput> {
        if !self.is_movie() {
            return None;
        }
        match state.prober.probe(&self.fullpath).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("メディア情報取得失敗: {} - {}", self.fullpath.display(), e);
                None
            }
        }
    }

    fn base_db_data(&self) -> NewFile {
        NewFile {
            basename: self.basename.clone(),
            fullpath: self.fullpath.to_string_lossy().to_string(),
            filesize: self.filesize,
            ctime: self.ctime,
            media: MediaColumns::default(),
        }
    }

    /// 保存用の射影。動画は ffprobe の情報を含める
    pub async fn to_db_data(&self, state: &AppState) -> NewFile {
        let mut data = self.base_db_data();
        if let Some(info) = self.get_media_info(state).await {
            data.media = info.to_columns();
        }
        data
    }

    // ---------- 永続化 ----------

    /// 保存して DB から読み直したレコードを返す
    pub async fn try_save(&self, state: &AppState) -> Result<Self> {
        let data = self.to_db_data(state).await;
        let fullpath = self.fullpath.clone();
        let row = state
            .with_store(move |store| {
                store.add(&data)?;
                store.find_by_fullpath(&data.fullpath)
            })
            .await?;
        let row = row.ok_or(MediaError::MissingAfterSave(fullpath))?;
        debug!("保存: {} (id={})", row.fullpath, row.id);
        Ok(Self::from_row(row))
    }

    /// 失敗時は元のレコードを返す
    pub async fn save(&self, state: &AppState) -> Self {
        match self.try_save(state).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("保存失敗: {} - {}", self.fullpath.display(), e);
                self.clone()
            }
        }
    }

    pub async fn try_toggle_favorite(&self, state: &AppState) -> Result<Self> {
        let id = self
            .id
            .ok_or_else(|| MediaError::NotPersisted(self.fullpath.clone()))?;
        let favorited = !self.favorited;
        let updated = state
            .with_store(move |store| store.set_favorited(id, favorited))
            .await?;
        if updated == 0 {
            return Err(MediaError::NotPersisted(self.fullpath.clone()));
        }
        Ok(self.with_favorited(favorited))
    }

    /// 失敗時は元のレコードを返す
    pub async fn toggle_favorite(&self, state: &AppState) -> Self {
        match self.try_toggle_favorite(state).await {
            Ok(toggled) => toggled,
            Err(e) => {
                warn!("お気に入り更新失敗: {} - {}", self.fullpath.display(), e);
                self.clone()
            }
        }
    }

    /// id があれば id で、なければ fullpath で DB を検索
    pub async fn is_persisted(&self, state: &AppState) -> bool {
        let id = self.id;
        let fullpath = self.fullpath.to_string_lossy().to_string();
        let found = state
            .with_store(move |store| match id {
                Some(id) => store.get(id),
                None => store.find_by_fullpath(&fullpath),
            })
            .await;
        matches!(found, Ok(Some(_)))
    }
}
