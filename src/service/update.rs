use crate::{
    printer::Report,
    service::{
        github::Hosting,
        leetcode::StatsProvider,
        publish::{self, Published},
    },
    Credentials, Result,
};
use chrono::{DateTime, TimeZone};
use log::info;
use std::fmt::Display;

/// Fetch, render and publish. The report is fully rendered before the first
/// hosting call, so a bad payload publishes nothing.
pub fn run<S, H, Tz>(
    stats: &S,
    hosting: &H,
    credentials: &Credentials,
    now: &DateTime<Tz>,
) -> Result<Published>
where
    S: StatsProvider + ?Sized,
    H: Hosting + ?Sized,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let payload = stats.fetch_stats(&credentials.leetcode_username)?;
    let report = Report::from_payload(&payload, now)?;

    let repo = credentials.repo_id()?;
    let full_name = match repo.owner {
        Some(ref owner) => repo.full_name(owner),
        None => repo.full_name(&hosting.login()?),
    };
    info!("Publishing report for {} to {}", credentials.leetcode_username, full_name);

    publish::publish(hosting, &full_name, report.as_str())
}
