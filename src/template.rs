use crate::Result;
use log::debug;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

pub const WORKFLOW_PATH: &str = ".github/workflows/leetcode-stats.yml";

/// Scheduled job that runs the updater against the repository it lives in.
pub const WORKFLOW: &str = r#"name: Update LeetCode Stats

on:
  schedule:
    - cron: "0 0 * * *"
  workflow_dispatch:

permissions:
  contents: write

jobs:
  update-stats:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - uses: dtolnay/rust-toolchain@stable
      - name: Update stats
        env:
          LEETCODE_USERNAME: ${{ secrets.LEETCODE_USERNAME }}
          GITHUB_TOKEN: ${{ secrets.GITHUB_TOKEN }}
          GITHUB_REPO: ${{ github.repository }}
        run: cargo run --release -- update
"#;

/// Write the workflow under `root` unless one is already there.
/// Returns whether a file was written.
pub fn ensure_workflow<P: AsRef<Path>>(root: P) -> Result<bool> {
    let path = root.as_ref().join(WORKFLOW_PATH);
    if path.exists() {
        debug!("Keeping existing {}", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, WORKFLOW)?;
    Ok(true)
}

/// Make sure `entry` (the credentials file) is listed in `.gitignore` so the
/// token never gets committed. Returns whether `.gitignore` was changed.
pub fn ensure_ignored<P: AsRef<Path>>(root: P, entry: &str) -> Result<bool> {
    let path = root.as_ref().join(".gitignore");
    let existing = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let ignored = existing
        .lines()
        .map(str::trim)
        .any(|line| line == entry || line.trim_start_matches('/') == entry);
    if ignored {
        return Ok(false);
    }

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if !existing.is_empty() && !existing.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{}", entry)?;
    Ok(true)
}
