use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use rusqlite::{Connection, OptionalExtension, Row};
use crate::database::migrations;
use crate::database::models::{FileRow, MediaColumns, NewFile};
use crate::database::FileStore;
use crate::error::Result;

const FILE_COLUMNS: &str = "id, basename, fullpath, filesize, ctime, width, height, duration, \
     vcodec, v_bit_rate, acodec, a_bit_rate, sample_rate, thumbnail_version, favorited";

/// SQLite によるライブラリ DB
#[derive(Clone)]
pub struct Database(Arc<Mutex<Connection>>);

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        migrations::run_migrations(&mut conn)?;
        Ok(Self(Arc::new(Mutex::new(conn))))
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // 他スレッドのパニックで汚染されても接続自体は使える
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn row_to_file(row: &Row<'_>) -> rusqlite::Result<FileRow> {
    Ok(FileRow {
        id: row.get(0)?,
        basename: row.get(1)?,
        fullpath: row.get(2)?,
        filesize: row.get(3)?,
        ctime: row.get(4)?,
        media: MediaColumns {
            width: row.get(5)?,
            height: row.get(6)?,
            duration: row.get(7)?,
            vcodec: row.get(8)?,
            v_bit_rate: row.get(9)?,
            acodec: row.get(10)?,
            a_bit_rate: row.get(11)?,
            sample_rate: row.get(12)?,
        },
        thumbnail_version: row.get(13)?,
        favorited: row.get(14)?,
    })
}

impl FileStore for Database {
    fn add(&self, file: &NewFile) -> Result<i64> {
        let id = self.conn().query_row(
            "INSERT INTO files (basename, fullpath, filesize, ctime, width, height, duration,
                                vcodec, v_bit_rate, acodec, a_bit_rate, sample_rate)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             RETURNING id",
            rusqlite::params![
                file.basename,
                file.fullpath,
                file.filesize,
                file.ctime,
                file.media.width,
                file.media.height,
                file.media.duration,
                file.media.vcodec,
                file.media.v_bit_rate,
                file.media.acodec,
                file.media.a_bit_rate,
                file.media.sample_rate,
            ],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(id)
    }

    fn get(&self, id: i64) -> Result<Option<FileRow>> {
        let sql = format!("SELECT {} FROM files WHERE id = ?1", FILE_COLUMNS);
        Ok(self.conn().query_row(&sql, [id], row_to_file).optional()?)
    }

    fn find_by_fullpath(&self, fullpath: &str) -> Result<Option<FileRow>> {
        let sql = format!("SELECT {} FROM files WHERE fullpath = ?1", FILE_COLUMNS);
        Ok(self.conn().query_row(&sql, [fullpath], row_to_file).optional()?)
    }

    fn set_favorited(&self, id: i64, favorited: bool) -> Result<usize> {
        Ok(self.conn().execute(
            "UPDATE files SET favorited = ?1 WHERE id = ?2",
            rusqlite::params![favorited, id],
        )?)
    }

    fn all(&self) -> Result<Vec<FileRow>> {
        let conn = self.conn();
        let sql = format!("SELECT {} FROM files ORDER BY fullpath", FILE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_file)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
