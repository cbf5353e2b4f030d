use crate::{
    service::{
        git::Git,
        github::{GithubClient, Hosting, NewRepository, Repository},
    },
    template, Config, Credentials, LeetSyncError, RepoId, Result, DEFAULT_REPO_NAME, REPORT_PATH,
    SECRET_NAME,
};
use ansi_term::Colour::{Green, Yellow};
use log::debug;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// The two setup flavours.
///
/// `Interactive` creates a fresh repository and pushes with upstream
/// tracking. `Simple` reuses an existing repository, replaces the secret and
/// force-pushes over the remote `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Interactive,
    Simple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub github_token: String,
    pub leetcode_username: String,
    pub repo_name: String,
}

/// Print `label`, read one line. Blank input yields `default` when given.
pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
    default: Option<&str>,
) -> Result<String> {
    match default {
        Some(default) => write!(out, "{} [{}]: ", label, default)?,
        None => write!(out, "{}: ", label)?,
    }
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let line = line.trim();

    Ok(match default {
        Some(default) if line.is_empty() => default.to_string(),
        _ => line.to_string(),
    })
}

/// Collect token, username and repository name. The token comes from
/// `read_token` so it can be read without echo.
pub fn collect_answers<R, W, F>(input: &mut R, out: &mut W, read_token: F) -> Result<Answers>
where
    R: BufRead,
    W: Write,
    F: FnOnce() -> Result<String>,
{
    writeln!(out, "\nStep 1: Enter your GitHub Personal Access Token")?;
    let github_token = read_token()?.trim().to_string();
    if github_token.is_empty() {
        return Err(LeetSyncError::InvalidConfig(
            "GitHub token must not be empty".into(),
        ));
    }

    writeln!(out, "\nStep 2: Enter your LeetCode username")?;
    let leetcode_username = ask(input, out, "LeetCode Username", None)?;
    if leetcode_username.is_empty() {
        return Err(LeetSyncError::InvalidConfig(
            "LeetCode username must not be empty".into(),
        ));
    }

    writeln!(
        out,
        "\nStep 3: Enter repository name (or press Enter for default)"
    )?;
    let repo_name = ask(input, out, "Repository Name", Some(DEFAULT_REPO_NAME))?;
    let repo: RepoId = repo_name.parse()?;
    if repo.owner.is_some() {
        return Err(LeetSyncError::InvalidConfig(format!(
            "`{}`: give the repository name only, it is created under your account",
            repo_name
        )));
    }

    Ok(Answers {
        github_token,
        leetcode_username,
        repo_name: repo.name,
    })
}

fn new_repository(login: &str, name: &str, variant: Variant) -> NewRepository {
    NewRepository {
        name: name.to_string(),
        description: "LeetCode Progress Tracker".into(),
        homepage: match variant {
            Variant::Interactive => Some(format!("https://github.com/{}/{}", login, name)),
            Variant::Simple => None,
        },
        has_wiki: false,
        has_issues: true,
        auto_init: true,
    }
}

/// Create (or, for `Simple`, find) the repository and store the username secret.
pub fn provision_remote<H: Hosting + ?Sized>(
    hosting: &H,
    login: &str,
    answers: &Answers,
    variant: Variant,
) -> Result<Repository> {
    let name = &answers.repo_name;
    let full_name = format!("{}/{}", login, name);

    let repo = match variant {
        Variant::Interactive => {
            println!("Creating repository {}...", name);
            hosting.create_repository(&new_repository(login, name, variant))?
        }
        Variant::Simple => match hosting.find_repository(&full_name)? {
            Some(repo) => {
                println!("Repository {} already exists. Updating...", name);
                repo
            }
            None => {
                println!("Creating new repository {}...", name);
                hosting.create_repository(&new_repository(login, name, variant))?
            }
        },
    };

    if variant == Variant::Simple && hosting.secret_exists(&repo.full_name, SECRET_NAME)? {
        println!("Secret already exists, updating...");
        hosting.delete_secret(&repo.full_name, SECRET_NAME)?;
    }
    hosting.create_secret(&repo.full_name, SECRET_NAME, &answers.leetcode_username)?;
    println!("{}", Green.paint("Repository secret set."));

    Ok(repo)
}

/// `.gitignore` entry for `env_file` when it sits inside `workdir`.
fn ignore_entry(workdir: &Path, env_file: &Path) -> Option<String> {
    let relative = if env_file.is_absolute() {
        env_file.strip_prefix(workdir).ok()?.to_path_buf()
    } else {
        env_file.to_path_buf()
    };
    let entry = relative.to_str()?.replace('\\', "/");
    let entry = entry.trim_start_matches("./").to_string();
    if entry.is_empty() || entry.starts_with("../") {
        None
    } else {
        Some(entry)
    }
}

fn confirm_force_push(repo_name: &str) -> Result<()> {
    let warning = format!(
        "The simple setup force-pushes this directory to {} and replaces the remote `main` history.",
        repo_name
    );
    println!("\n{}", Yellow.paint(warning));

    let stdin = io::stdin();
    let answer = ask(&mut stdin.lock(), &mut io::stdout(), "Continue? (y/N)", None)?;
    if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
        Ok(())
    } else {
        Err(LeetSyncError::Aborted)
    }
}

/// Full wizard: prompts, credentials file, remote repository and secret,
/// then the local tree is committed and pushed.
pub fn run(config: &Config, env_file: &Path, variant: Variant, assume_yes: bool) -> Result<()> {
    println!("=== LeetCode Progress Tracker Setup ===");

    let answers = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        collect_answers(&mut input, &mut io::stdout(), || {
            Ok(rpassword::prompt_password_stdout("GitHub Token: ")?)
        })?
    };

    if variant == Variant::Simple && !assume_yes {
        confirm_force_push(&answers.repo_name)?;
    }

    let hosting = GithubClient::new(config, &answers.github_token)?;
    let login = hosting.login()?;
    debug!("Authenticated as {}", login);

    let credentials = Credentials {
        leetcode_username: answers.leetcode_username.clone(),
        github_token: answers.github_token.clone(),
        github_repo: format!("{}/{}", login, answers.repo_name),
    };
    credentials.save(env_file)?;

    println!("\nSetting up GitHub repository...");
    let repo = provision_remote(&hosting, &login, &answers, variant)?;

    println!("\nSetting up local repository...");
    let workdir: PathBuf = env::current_dir()?;
    if template::ensure_workflow(&workdir)? {
        println!("Added {}", template::WORKFLOW_PATH);
    }
    if let Some(entry) = ignore_entry(&workdir, env_file) {
        template::ensure_ignored(&workdir, &entry)?;
    }

    println!("\nPushing to GitHub...");
    let remote_url = format!("{}/{}.git", config.urls.github_web, repo.full_name);
    Git::new(workdir).publish_tree(&remote_url, variant == Variant::Simple)?;

    println!("\n{}", Green.paint("=== Setup Complete! ==="));
    println!("\nYour LeetCode progress will be tracked at:\n{}", repo.html_url);
    println!("The GitHub Action will start running automatically.");
    println!("\nYou can view your progress at:\n{}", report_url(&repo));

    Ok(())
}

/// Browser link to the rendered report on the pushed branch.
fn report_url(repo: &Repository) -> String {
    format!("{}/blob/main/{}", repo.html_url, REPORT_PATH)
}
