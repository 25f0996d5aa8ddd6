//! Best-effort publish of the data file: stage, commit, push.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

/// Stage the data file, commit with the given message, and push. Runs git
/// in the store's directory; the first failing step aborts the run with
/// that step named. The already-written JSON is not rolled back.
pub fn commit_and_push(data_path: &Path, message: &str) -> Result<()> {
    let dir = match data_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file = data_path
        .file_name()
        .context("データファイルのパスが不正です")?
        .to_string_lossy()
        .into_owned();

    run_git(dir, &["add", &file])?;
    run_git(dir, &["commit", "-m", message])?;
    run_git(dir, &["push"])?;
    Ok(())
}

fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
    let status = Command::new("git")
        .current_dir(dir)
        .args(args)
        .status()
        .with_context(|| format!("git {} を実行できません", args.join(" ")))?;
    if !status.success() {
        bail!("git {} が失敗しました ({})", args.join(" "), status);
    }
    Ok(())
}
