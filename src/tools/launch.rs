use std::path::Path;
use std::process::{Command, Stdio};
use crate::error::{MediaError, Result};

/// シェル形式のコマンドテンプレートをプログラムと引数に分解
pub fn parse_command(template: &str) -> Result<(String, Vec<String>)> {
    let mut words = shell_words::split(template)
        .map_err(|e| MediaError::CommandParse(format!("{}: {}", template, e)))?;
    if words.is_empty() {
        return Err(MediaError::CommandParse("空のコマンド".to_string()));
    }
    let program = words.remove(0);
    Ok((program, words))
}

/// テンプレートのコマンドをファイルパス付きで起動する。
/// 子プロセスは切り離し、終了を待たない
pub fn spawn_detached(template: &str, path: &Path) -> Result<()> {
    let (program, args) = parse_command(template)?;

    let mut command = Command::new(&program);
    command
        .args(&args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        const DETACHED_PROCESS: u32 = 0x0000_0008;
        command.creation_flags(DETACHED_PROCESS);
    }

    // Child は保持しない
    command.spawn()?;
    Ok(())
}
