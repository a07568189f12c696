// サムネイル設定（既定値）
pub const DEFAULT_THUMBNAIL_COUNT: u32 = 5;
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 320; // 幅(px)。高さはアスペクト比から算出

// 動画のシーク位置の上限（%）
pub const MAX_SEEK_PERCENT: f64 = 99.0;

// 画像サイズ制限（DoS防止）
pub const MAX_IMAGE_DIMENSION: u32 = 65535;      // 最大辺長
pub const MAX_PIXEL_COUNT: u64 = 100_000_000;    // 最大ピクセル数（100メガピクセル）
pub const MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024; // アーカイブ内1エントリの最大展開サイズ

// 動画として扱う拡張子（小文字で比較）
pub const MOVIE_EXTENSIONS: &[&str] = &[
    "3g2", "3gp", "asf", "avi", "divx", "flv", "m2v", "m4v", "mkv", "mov", "mp2",
    "mp4", "mpe", "mpeg", "mpg", "nsv", "ogm", "qt", "rm", "rmvb", "vob", "wmv",
];

// スキャン対象のアーカイブ拡張子
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "cbz"];

// アーカイブ内でサムネイル候補にする画像の拡張子
pub const IMAGE_EXTENSIONS: &[&str] = &["bmp", "jpg", "png"];

// 外部ツール
pub const DEFAULT_THUMBNAILER: &str = "ffmpegthumbnailer";
pub const DEFAULT_PROBE: &str = "ffprobe";

// アプリケーションディレクトリ名
pub const APP_DIR_NAME: &str = "media-shelf";

// 同時にサムネイル生成するレコード数
pub const CATALOG_CONCURRENCY: usize = 4;
