use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::{LeetSyncError, Result};

/// LeetCode problem classification. `All` is the aggregate row the API
/// returns next to the three real buckets.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    All,
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::All => "All",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(name)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DifficultyCount {
    pub difficulty: Difficulty,
    pub count: u64,
    pub submissions: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    pub ac_submission_num: Vec<DifficultyCount>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub ranking: i64,
    pub reputation: i64,
    pub star_rating: f64,
    pub real_name: Option<String>,
    pub user_avatar: Option<String>,
}

/// The API sends some numbers as strings.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Either {
    Number(i64),
    String(String),
}

impl Either {
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Either::Number(n) => Ok(*n),
            Either::String(s) => s
                .trim()
                .parse()
                .map_err(|_| LeetSyncError::Shape(format!("`{}` is not a number", s))),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecentSubmission {
    pub title: String,
    pub timestamp: Either,
    pub status_display: String,
    pub lang: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUser {
    pub username: String,
    pub submit_stats: SubmitStats,
    pub profile: Profile,
    pub recent_submission_list: Vec<RecentSubmission>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub matched_user: Option<MatchedUser>,
}

#[derive(Deserialize, Debug)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct StatsResponse {
    pub data: Option<StatsData>,
    pub errors: Option<Vec<GraphqlError>>,
}

impl StatsResponse {
    pub fn from_value(payload: &Value) -> Result<Self> {
        StatsResponse::deserialize(payload).map_err(|e| LeetSyncError::Shape(e.to_string()))
    }

    /// Extract the user record, surfacing GraphQL errors first.
    pub fn into_user(self) -> Result<MatchedUser> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(LeetSyncError::Shape(format!(
                "GraphQL reported errors: {}",
                messages.join("; ")
            )));
        }

        self.data
            .ok_or_else(|| LeetSyncError::Shape("missing field `data`".into()))?
            .matched_user
            .ok_or_else(|| LeetSyncError::Shape("no matching LeetCode user".into()))
    }
}

impl MatchedUser {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        StatsResponse::from_value(payload)?.into_user()
    }

    /// Per-difficulty rows, without the `All` aggregate.
    pub fn buckets(&self) -> impl Iterator<Item = &DifficultyCount> {
        self.submit_stats
            .ac_submission_num
            .iter()
            .filter(|s| s.difficulty != Difficulty::All)
    }

    pub fn total_solved(&self) -> u64 {
        self.buckets().map(|s| s.count).sum()
    }

    pub fn total_submissions(&self) -> u64 {
        self.buckets().map(|s| s.submissions).sum()
    }

    /// Accepted over submitted, as a percentage rounded to two decimals
    /// (ties go to the even digit).
    pub fn acceptance_rate(&self) -> f64 {
        let submissions = self.total_submissions();
        if submissions == 0 {
            return 0.0;
        }
        let rate = self.total_solved() as f64 / submissions as f64 * 100.0;
        (rate * 100.0).round_ties_even() / 100.0
    }
}
