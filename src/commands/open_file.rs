use std::path::Path;
use crate::commands::library::find_record;
use crate::error::Result;
use crate::state::AppState;

/// 設定されたコマンド（省略時は拡張子の既定コマンド）でファイルを開く
pub async fn open_file(state: &AppState, path: &Path, command_name: Option<&str>) -> Result<bool> {
    let record = find_record(state, path).await?;
    Ok(record.execute(&state.config, command_name))
}
