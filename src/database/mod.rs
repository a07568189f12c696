mod connection;
mod migrations;
mod models;

pub use connection::Database;
pub use models::{FileRow, MediaColumns, NewFile};

use crate::error::Result;

/// files コレクションへのアクセス。ブロッキング呼び出しなので
/// 非同期コードからは spawn_blocking 経由で使う
pub trait FileStore: Send + Sync {
    fn add(&self, file: &NewFile) -> Result<i64>;
    fn get(&self, id: i64) -> Result<Option<FileRow>>;
    fn find_by_fullpath(&self, fullpath: &str) -> Result<Option<FileRow>>;
    /// 更新した行数を返す
    fn set_favorited(&self, id: i64, favorited: bool) -> Result<usize>;
    fn all(&self) -> Result<Vec<FileRow>>;
}
