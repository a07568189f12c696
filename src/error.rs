use std::path::PathBuf;
use thiserror::Error;

/// ライブラリ内部のエラー。境界の操作ではログ出力して握りつぶす
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("データベースエラー: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("アーカイブ読み込みエラー: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("画像処理エラー: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML解析エラー: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{program} が失敗しました ({status}): {stderr}")]
    Tool {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("バックグラウンドタスクエラー: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("無効な画像サイズ: {0}")]
    Dimensions(String),

    #[error("エントリが大きすぎます: {name} (最大: {limit} バイト)")]
    EntryTooLarge { name: String, limit: u64 },

    #[error("コマンドが設定されていません: {0}")]
    UnknownCommand(String),

    #[error("コマンドの解析に失敗: {0}")]
    CommandParse(String),

    #[error("未保存のレコードです: {}", .0.display())]
    NotPersisted(PathBuf),

    #[error("保存後のレコードが見つかりません: {}", .0.display())]
    MissingAfterSave(PathBuf),
}

pub type Result<T, E = MediaError> = std::result::Result<T, E>;
