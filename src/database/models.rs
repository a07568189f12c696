use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 動画のメタデータ列（ffprobe から取得、未取得なら None）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaColumns {
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// 秒
    pub duration: Option<i64>,
    pub vcodec: Option<String>,
    pub v_bit_rate: Option<i64>,
    pub acodec: Option<String>,
    pub a_bit_rate: Option<i64>,
    pub sample_rate: Option<i64>,
}

/// 保存用の射影（id などストア側で決まる列を含まない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFile {
    pub basename: String,
    pub fullpath: String,
    pub filesize: i64,
    pub ctime: DateTime<Utc>,
    #[serde(flatten)]
    pub media: MediaColumns,
}

/// files テーブルの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRow {
    pub id: i64,
    pub basename: String,
    pub fullpath: String,
    pub filesize: i64,
    pub ctime: DateTime<Utc>,
    #[serde(flatten)]
    pub media: MediaColumns,
    pub thumbnail_version: i64,
    pub favorited: bool,
}
