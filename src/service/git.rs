use crate::{LeetSyncError, Result};
use log::debug;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Runs `git` in a fixed working tree, one command at a time.
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new<P: Into<PathBuf>>(workdir: P) -> Self {
        Git {
            workdir: workdir.into(),
        }
    }

    /// Run `git <args>` and return trimmed stdout; non-zero exit is an error.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("git {}", args.join(" "));
        debug!("Running `{}` in {}", command, self.workdir.display());

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| LeetSyncError::Process {
                command: command.clone(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(LeetSyncError::Process {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// `git init`, commit everything, point `origin` at `remote_url` and push
    /// `main`. With `force` the old `.git` is dropped first, so `origin` is
    /// always new, and the push overwrites the remote branch.
    pub fn publish_tree(&self, remote_url: &str, force: bool) -> Result<()> {
        if force {
            let dot_git = self.workdir.join(".git");
            if dot_git.exists() {
                debug!("Removing {}", dot_git.display());
                fs::remove_dir_all(&dot_git)?;
            }
        }

        self.run(&["init"])?;
        self.run(&["add", "."])?;
        self.run(&["commit", "-m", "Initial commit"])?;

        self.run(&["remote", "add", "origin", remote_url])?;
        self.run(&["branch", "-M", "main"])?;

        if force {
            self.run(&["push", "-f", "origin", "main"])?;
        } else {
            self.run(&["push", "-u", "origin", "main"])?;
        }
        Ok(())
    }
}
