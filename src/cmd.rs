use crate::{
    config::{load_env_file, require},
    icon::Icon,
    printer::{Printer, Report},
    service::{
        setup::{self, Variant},
        update, GithubClient, Leetcode, Published, StatsProvider,
    },
    Config, Credentials, Result, LEETCODE_USERNAME, REPORT_PATH,
};
use ansi_term::Colour::Green;
use chrono::Local;
use clap::AppSettings;
use log::debug;
use serde_json::Value;
use spinners::{Spinner, Spinners};
use std::env;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct Update {
    /// Print the rendered report instead of publishing it.
    #[structopt(long)]
    pub dry_run: bool,
}

#[derive(Debug, StructOpt)]
pub struct Setup {
    /// Reuse an existing repository, replace the secret and force-push.
    #[structopt(long)]
    pub simple: bool,

    /// Don't ask before force-pushing.
    #[structopt(short, long)]
    pub yes: bool,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Fetch LeetCode stats and publish the report
    #[structopt(name = "update")]
    Update(Update),

    /// Create the tracking repository and push this directory to it
    #[structopt(name = "setup")]
    Setup(Setup),
}

#[derive(StructOpt, Debug)]
#[structopt(name = "leetsync", setting = AppSettings::SubcommandRequiredElseHelp)]
pub struct LeetSyncArgs {
    /// Credentials file holding LEETCODE_USERNAME, GITHUB_TOKEN and GITHUB_REPO
    #[structopt(long, default_value = ".env")]
    pub env_file: String,

    #[structopt(subcommand)]
    pub command: Command,
}

/// Shows a spinner while the wrapped provider waits on the network.
struct Spinning<'a, S: StatsProvider>(&'a S);

impl<'a, S: StatsProvider> StatsProvider for Spinning<'a, S> {
    fn fetch_stats(&self, username: &str) -> Result<Value> {
        let sp = Spinner::new(Spinners::Dots9, "Waiting for LeetCode!".into());
        let payload = self.0.fetch_stats(username);
        sp.stop();
        println!();
        payload
    }
}

pub fn process() -> Result<()> {
    let opt = LeetSyncArgs::from_args();
    debug!("Options: {:#?}", opt);
    let env_file = PathBuf::from(shellexpand::tilde(&opt.env_file).into_owned());

    match opt.command {
        Command::Update(opts) => {
            load_env_file(&env_file)?;
            update_stats(&Config::get(), opts)?;
        }
        Command::Setup(opts) => {
            let variant = if opts.simple {
                Variant::Simple
            } else {
                Variant::Interactive
            };
            setup::run(&Config::get(), &env_file, variant, opts.yes)?;
        }
    }
    Ok(())
}

fn update_stats(config: &Config, opts: Update) -> Result<()> {
    let lookup = |key: &str| env::var(key).ok();
    let username = require(lookup, LEETCODE_USERNAME)?;
    let leetcode = Leetcode::new(config.clone());

    if opts.dry_run {
        let payload = leetcode.fetch_stats(&username)?;
        Report::from_payload(&payload, &Local::now())?.print();
        return Ok(());
    }

    let credentials = Credentials::from_lookup(lookup)?;
    let hosting = GithubClient::new(config, &credentials.github_token)?;

    println!("Fetching stats for user: {}", username);
    let published = update::run(
        &Spinning(&leetcode),
        &hosting,
        &credentials,
        &Local::now(),
    )?;

    let verb = match published {
        Published::Created => "Created",
        Published::Updated => "Updated",
    };
    println!(
        "{}",
        Green.paint(format!(
            "{} {} {} in {}",
            Icon::Yes,
            verb,
            REPORT_PATH,
            credentials.github_repo
        ))
    );
    Ok(())
}
