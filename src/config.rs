use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::constants::{
    APP_DIR_NAME, DEFAULT_PROBE, DEFAULT_THUMBNAIL_COUNT, DEFAULT_THUMBNAIL_SIZE,
    DEFAULT_THUMBNAILER,
};
use crate::error::Result;

/// アプリケーション設定。読み込み後は変更しない
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thumbnail: ThumbnailConfig,
    /// SQLite データベースのパス
    pub database: PathBuf,
    /// カタログがスキャンするディレクトリ
    pub targets: Vec<PathBuf>,
    pub tools: ToolsConfig,
    /// 拡張子（小文字）ごとの起動コマンド
    pub commands: HashMap<String, ExtensionCommands>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    pub dir: PathBuf,
    pub count: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub thumbnailer: String,
    pub probe: String,
}

/// シェル形式のコマンドテンプレート。実行時にファイルパスが末尾に付与される
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionCommands {
    pub default: Option<String>,
    #[serde(default)]
    pub named: BTreeMap<String, String>,
}

// ユーザーデータディレクトリを取得
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

// 設定ディレクトリを取得
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

// OS 標準の「開く」コマンド
pub fn platform_open_command() -> &'static str {
    if cfg!(target_os = "windows") {
        r#"cmd /C start """#
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thumbnail: ThumbnailConfig::default(),
            database: data_dir().join("library.db"),
            targets: Vec::new(),
            tools: ToolsConfig::default(),
            commands: HashMap::new(),
        }
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            dir: data_dir().join("thumbnails"),
            count: DEFAULT_THUMBNAIL_COUNT,
            size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            thumbnailer: DEFAULT_THUMBNAILER.to_string(),
            probe: DEFAULT_PROBE.to_string(),
        }
    }
}

impl Config {
    /// 明示されたパス、なければ設定ディレクトリの config.yml → config.json の順で読み込む。
    /// どれも存在しなければ既定値
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let dir = config_dir();
        for name in ["config.yml", "config.json"] {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Self::from_file(&candidate);
            }
        }

        debug!("設定ファイルなし、既定値を使用");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        debug!("設定読み込み: {}", path.display());
        Ok(config)
    }

    fn commands_for(&self, extname: &str) -> Option<&ExtensionCommands> {
        self.commands.get(&extname.to_lowercase())
    }

    /// 拡張子の既定コマンド（未設定なら OS 標準の「開く」）
    pub fn get_command(&self, extname: &str) -> String {
        self.commands_for(extname)
            .and_then(|c| c.default.clone())
            .unwrap_or_else(|| platform_open_command().to_string())
    }

    /// 拡張子に設定された名前付きコマンド
    pub fn get_all_commands(&self, extname: &str) -> BTreeMap<String, String> {
        self.commands_for(extname)
            .map(|c| c.named.clone())
            .unwrap_or_default()
    }
}
