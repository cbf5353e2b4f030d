use chrono::{DateTime, TimeZone};
use serde_json::Value;
use std::fmt::Display;

use crate::model::{MatchedUser, RecentSubmission};
use crate::printer::{
    decorator::{bullet, heading},
    Printer, NEW_LINE,
};
use crate::{LeetSyncError, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RECENT_LIMIT: usize = 5;

/// Markdown progress report for one LeetCode user.
///
/// Rendering depends only on the payload and the supplied clock; submission
/// times are shown in the clock's time zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    markdown: String,
}

impl Printer for Report {
    fn buffer(&self) -> String {
        self.markdown.clone()
    }
}

impl Report {
    pub fn from_payload<Tz>(payload: &Value, now: &DateTime<Tz>) -> Result<Self>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let user = MatchedUser::from_payload(payload)?;
        Report::render(&user, now)
    }

    pub fn render<Tz>(user: &MatchedUser, now: &DateTime<Tz>) -> Result<Self>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let profile = &user.profile;
        let real_name = profile
            .real_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Not provided");

        let mut md = String::new();
        md.push_str(&heading(1, "LeetCode Progress Tracker"));
        md.push_str(NEW_LINE);
        md.push_str(&format!(
            "Last Updated: {}{}",
            now.format(TIMESTAMP_FORMAT),
            NEW_LINE
        ));
        md.push_str(NEW_LINE);

        md.push_str(&heading(2, "Profile"));
        md.push_str(&bullet(&format!("Username: {}", user.username)));
        md.push_str(&bullet(&format!("Name: {}", real_name)));
        md.push_str(&bullet(&format!("Ranking: #{}", profile.ranking)));
        md.push_str(&bullet(&format!("Reputation: {}", profile.reputation)));
        md.push_str(&bullet(&format!(
            "Star Rating: {}",
            star_rating(profile.star_rating)
        )));
        md.push_str(NEW_LINE);

        md.push_str(&heading(2, "Overall Stats"));
        md.push_str(&bullet(&format!(
            "Total Problems Solved: {}",
            user.total_solved()
        )));
        md.push_str(&bullet(&format!(
            "Acceptance Rate: {:.2}%",
            user.acceptance_rate()
        )));
        md.push_str(NEW_LINE);

        md.push_str(&heading(2, "Problems Solved by Difficulty"));
        for bucket in user.buckets() {
            md.push_str(&bullet(&format!(
                "{}: {} problems",
                bucket.difficulty, bucket.count
            )));
        }

        md.push_str(NEW_LINE);
        md.push_str(&heading(2, "Recent Submissions"));
        for submission in user.recent_submission_list.iter().take(RECENT_LIMIT) {
            md.push_str(&bullet(&submission_line(submission, now)?));
        }

        Ok(Report { markdown: md })
    }

    pub fn as_str(&self) -> &str {
        &self.markdown
    }
}

fn submission_line<Tz>(submission: &RecentSubmission, now: &DateTime<Tz>) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let secs = submission.timestamp.as_i64()?;
    let at = now
        .timezone()
        .timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| LeetSyncError::Shape(format!("timestamp {} out of range", secs)))?;

    Ok(format!(
        "{} ({}) - {} - {}",
        submission.title,
        submission.lang,
        submission.status_display,
        at.format(TIMESTAMP_FORMAT)
    ))
}

/// Whole ratings keep one decimal, e.g. `3.0`.
fn star_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{:.1}", rating)
    } else {
        rating.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use chrono::{FixedOffset, Utc};
    use serde_json::json;

    fn frozen() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn renders_full_report() {
        let report = Report::from_payload(&fixtures::sample(), &frozen()).unwrap();

        let expected = "\
# LeetCode Progress Tracker

Last Updated: 2024-03-01 12:30:00

## Profile
- Username: alice
- Name: Alice Liddell
- Ranking: #123456
- Reputation: 7
- Star Rating: 2.5

## Overall Stats
- Total Problems Solved: 15
- Acceptance Rate: 42.86%

## Problems Solved by Difficulty
- Easy: 10 problems
- Medium: 5 problems
- Hard: 0 problems

## Recent Submissions
- Two Sum (rust) - Accepted - 2023-11-14 22:13:20
- Add Two Numbers (python3) - Wrong Answer - 2023-11-14 19:26:40
";
        assert_eq!(report.as_str(), expected);
    }

    #[test]
    fn same_clock_same_bytes() {
        let a = Report::from_payload(&fixtures::sample(), &frozen()).unwrap();
        let b = Report::from_payload(&fixtures::sample(), &frozen()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn only_the_header_depends_on_the_clock() {
        let later = frozen() + chrono::Duration::hours(5);
        let a = Report::from_payload(&fixtures::sample(), &frozen()).unwrap();
        let b = Report::from_payload(&fixtures::sample(), &later).unwrap();

        let diff: Vec<(&str, &str)> = a
            .as_str()
            .lines()
            .zip(b.as_str().lines())
            .filter(|(x, y)| x != y)
            .collect();
        assert_eq!(diff.len(), 1);
        assert!(diff[0].0.starts_with("Last Updated: "));
    }

    #[test]
    fn submission_times_follow_the_clock_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = frozen().with_timezone(&tz);
        let report = Report::from_payload(&fixtures::sample(), &now).unwrap();

        assert!(report.as_str().contains("Last Updated: 2024-03-01 14:30:00"));
        assert!(report
            .as_str()
            .contains("- Two Sum (rust) - Accepted - 2023-11-15 00:13:20"));
    }

    #[test]
    fn at_most_five_recent_submissions() {
        let mut payload = fixtures::sample();
        let submissions: Vec<_> = (0..8)
            .map(|i| {
                json!({
                    "title": format!("Problem {}", i),
                    "timestamp": 1_700_000_000 + i,
                    "statusDisplay": "Accepted",
                    "lang": "cpp"
                })
            })
            .collect();
        payload["data"]["matchedUser"]["recentSubmissionList"] = json!(submissions);

        let report = Report::from_payload(&payload, &frozen()).unwrap();
        let recent = report
            .as_str()
            .split("## Recent Submissions\n")
            .nth(1)
            .unwrap();
        assert_eq!(recent.lines().count(), 5);
    }

    #[test]
    fn missing_real_name_falls_back() {
        let mut payload = fixtures::sample();
        payload["data"]["matchedUser"]["profile"]
            .as_object_mut()
            .unwrap()
            .remove("realName");

        let report = Report::from_payload(&payload, &frozen()).unwrap();
        assert!(report.as_str().contains("- Name: Not provided\n"));
    }

    #[test]
    fn whole_star_rating_keeps_a_decimal() {
        assert_eq!(star_rating(3.0), "3.0");
        assert_eq!(star_rating(4.5), "4.5");
    }

    #[test]
    fn zero_submissions_render_zero_rate() {
        let payload = fixtures::payload(json!([
            { "difficulty": "All", "count": 0, "submissions": 0 },
            { "difficulty": "Easy", "count": 0, "submissions": 0 }
        ]));
        let report = Report::from_payload(&payload, &frozen()).unwrap();
        assert!(report.as_str().contains("- Acceptance Rate: 0.00%\n"));
    }

    #[test]
    fn half_hundredth_rate_rounds_to_even() {
        let payload = fixtures::payload(json!([
            { "difficulty": "All", "count": 1, "submissions": 32 },
            { "difficulty": "Easy", "count": 1, "submissions": 32 }
        ]));
        let report = Report::from_payload(&payload, &frozen()).unwrap();
        assert!(report.as_str().contains("- Acceptance Rate: 3.12%\n"));
    }

    #[test]
    fn bad_timestamp_aborts_rendering() {
        let mut payload = fixtures::sample();
        payload["data"]["matchedUser"]["recentSubmissionList"][0]["timestamp"] = json!("never");
        assert!(Report::from_payload(&payload, &frozen()).is_err());
    }
}
