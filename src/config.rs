use crate::{LeetSyncError, Result};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

pub const LEETCODE_USERNAME: &str = "LEETCODE_USERNAME";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const GITHUB_REPO: &str = "GITHUB_REPO";

/// Directory inside the target repository that holds the report.
pub const REPORT_DIR: &str = "dsa";
/// Placeholder committed when `REPORT_DIR` does not exist yet.
pub const REPORT_PLACEHOLDER: &str = "dsa/.gitkeep";
/// Report location inside the target repository.
pub const REPORT_PATH: &str = "dsa/leetcode_stats.md";

pub const DEFAULT_REPO_NAME: &str = "leetcode-progress";
pub const SECRET_NAME: &str = "LEETCODE_USERNAME";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Urls {
    pub leetcode: String,
    pub graphql: String,
    pub github_api: String,
    pub github_web: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub urls: Urls,
}

impl Config {
    pub fn new(urls: Urls) -> Self {
        Config { urls }
    }

    /// Public endpoints, overridable through `LEETCODE_GRAPHQL_URL` and `GITHUB_API_URL`.
    pub fn get() -> Self {
        let base = "https://leetcode.com";
        let urls = Urls {
            leetcode: base.to_owned(),
            graphql: env::var("LEETCODE_GRAPHQL_URL")
                .unwrap_or_else(|_| format!("{}/graphql", base)),
            github_api: env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            github_web: "https://github.com".to_string(),
        };

        Config::new(urls)
    }
}

/// The three values shared between `setup` and `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub leetcode_username: String,
    pub github_token: String,
    pub github_repo: String,
}

impl Credentials {
    /// Load `env_file` into the process environment (existing variables win),
    /// then read all three keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Credentials {
            leetcode_username: require(&lookup, LEETCODE_USERNAME)?,
            github_token: require(&lookup, GITHUB_TOKEN)?,
            github_repo: require(&lookup, GITHUB_REPO)?,
        })
    }

    pub fn repo_id(&self) -> Result<RepoId> {
        self.github_repo.parse()
    }

    /// Overwrite `path` with the credentials in `KEY=value` form.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        debug!("Writing credentials to {}", path.as_ref().display());
        fs::write(path, self.to_env_string())?;
        Ok(())
    }

    fn to_env_string(&self) -> String {
        format!(
            "{}={}\n{}={}\n{}={}\n",
            LEETCODE_USERNAME,
            self.leetcode_username,
            GITHUB_TOKEN,
            self.github_token,
            GITHUB_REPO,
            self.github_repo
        )
    }
}

/// Read one required key, treating blank values as absent.
pub fn require<F>(lookup: F, key: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(LeetSyncError::MissingConfig(key))
}

/// A missing file is fine; CI runs pass everything through the environment.
pub fn load_env_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!("Loaded {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
            debug!("No env file at {}", path.display());
            Ok(())
        }
        Err(e) => Err(LeetSyncError::InvalidConfig(format!(
            "{}: {}",
            path.display(),
            e
        ))),
    }
}

/// Target repository, either `owner/name` or a bare `name` owned by the token's user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: Option<String>,
    pub name: String,
}

impl RepoId {
    pub fn full_name(&self, login: &str) -> String {
        format!("{}/{}", self.owner.as_deref().unwrap_or(login), self.name)
    }
}

impl FromStr for RepoId {
    type Err = LeetSyncError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let re = Regex::new(r"^(?:([A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)/)?([A-Za-z0-9._-]+)$")?;
        let caps = re
            .captures(s.trim())
            .ok_or_else(|| LeetSyncError::InvalidConfig(format!("bad repository `{}`", s)))?;
        let name = caps[2].to_string();
        if name == "." || name == ".." {
            return Err(LeetSyncError::InvalidConfig(format!(
                "bad repository `{}`",
                s
            )));
        }

        Ok(RepoId {
            owner: caps.get(1).map(|m| m.as_str().to_string()),
            name,
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            Some(ref owner) => write!(f, "{}/{}", owner, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
