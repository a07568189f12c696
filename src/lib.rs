mod cache;
mod commands;
mod config;
mod constants;
mod database;
mod error;
mod fs_utils;
mod image_utils;
mod media;
mod state;
mod thumbnail;
mod tools;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use cache::ThumbnailCache;
pub use config::{Config, ExtensionCommands, ThumbnailConfig, ToolsConfig};
pub use database::{Database, FileRow, FileStore, MediaColumns, NewFile};
pub use error::{MediaError, Result};
pub use fs_utils::{check_access, ensure_directory};
pub use media::{MediaKind, MediaRecord, ProbeOutput};
pub use state::AppState;
pub use thumbnail::{seek_percent, ThumbnailOptions};
pub use tools::{FfProbe, FfmpegThumbnailer, FrameRequest, MediaProber, VideoThumbnailer};

use commands::folder::get_folder_contents;
use commands::library::{ensure_thumbnails, list_files, sync_library, toggle_favorite};
use commands::open_file::open_file;

#[derive(Parser, Debug)]
#[command(name = "media-shelf", about = "動画・アーカイブのライブラリとサムネイルキャッシュ")]
struct Cli {
    /// 設定ファイル（YAML または JSON）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// フォルダを走査して登録し、サムネイルを生成
    Scan {
        /// 省略時は設定の targets
        dirs: Vec<PathBuf>,
    },
    /// 登録済みファイルの一覧
    List {
        #[arg(long)]
        favorites: bool,
    },
    /// 1ファイルのサムネイルを生成
    Thumbnails {
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
    /// お気に入りを切り替え
    Favorite { path: PathBuf },
    /// 外部コマンドで開く
    Open {
        path: PathBuf,
        /// 名前付きコマンド
        #[arg(long = "command")]
        command_name: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("media_shelf_lib=info,media_shelf=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn print_record(record: &MediaRecord) {
    let favorite = if record.favorited { "*" } else { " " };
    let detail = match (record.resolution(), record.duration_str()) {
        (Some(resolution), Some(duration)) => format!("{} {}", resolution, duration),
        _ => String::new(),
    };
    println!("{} {}\t{}\t{}", favorite, record.fullpath.display(), record.filesize, detail);
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let db = Database::open(&config.database)?;
    let state = AppState::new(config, Arc::new(db));

    match cli.command {
        Command::Scan { dirs } => {
            let dirs = if dirs.is_empty() { state.config.targets.clone() } else { dirs };
            if dirs.is_empty() {
                anyhow::bail!("走査するフォルダが指定されていません");
            }
            let paths: Vec<PathBuf> = dirs.iter().flat_map(|d| get_folder_contents(d)).collect();
            for record in sync_library(&state, paths).await {
                print_record(&record);
            }
        }
        Command::List { favorites } => {
            for record in list_files(&state, favorites).await? {
                print_record(&record);
            }
        }
        Command::Thumbnails { path, force } => {
            let record = ensure_thumbnails(&state, &path, force).await?;
            let count = state.config.thumbnail.count;
            for thumbnail in record.thumbnails(&state.cache, count) {
                let mark = if check_access(&thumbnail).await { "ok" } else { "missing" };
                println!("{}\t{}", mark, thumbnail.display());
            }
        }
        Command::Favorite { path } => {
            print_record(&toggle_favorite(&state, &path).await?);
        }
        Command::Open { path, command_name } => {
            if !open_file(&state, &path, command_name.as_deref()).await? {
                anyhow::bail!("起動できませんでした: {}", path.display());
            }
        }
    }

    Ok(())
}
