use crate::{fetch, Config, LeetSyncError, Result};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, REFERER};
use serde_json::{json, Value};

pub const STATS_QUERY: &str = r#"
query getUserProfile($username: String!) {
    matchedUser(username: $username) {
        username
        submitStats: submitStatsGlobal {
            acSubmissionNum {
                difficulty
                count
                submissions
            }
        }
        profile {
            ranking
            reputation
            starRating
            realName
            userAvatar
        }
        recentSubmissionList(limit: 5) {
            title
            timestamp
            statusDisplay
            lang
        }
    }
}
"#;

/// StatsProvider hands back the raw GraphQL payload for one user. Parsing is
/// left to the report so a malformed payload never reaches the publisher.
#[cfg_attr(test, mockall::automock)]
pub trait StatsProvider {
    fn fetch_stats(&self, username: &str) -> Result<Value>;
}

/// Leetcode talks to the public GraphQL endpoint, one request per call.
pub struct Leetcode {
    config: Config,
}

impl Leetcode {
    pub fn new(config: Config) -> Self {
        Leetcode { config }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, HeaderValue::from_str(&self.config.urls.leetcode)?);
        Ok(headers)
    }
}

/// GraphQL request body for `username`.
pub fn stats_request(username: &str) -> Value {
    json!({
        "query": STATS_QUERY,
        "variables": { "username": username },
    })
}

impl StatsProvider for Leetcode {
    fn fetch_stats(&self, username: &str) -> Result<Value> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LeetSyncError::InvalidConfig(
                "LeetCode username must not be empty".into(),
            ));
        }

        let url = &self.config.urls.graphql;
        debug!("Fetching stats for {} from {}", username, url);
        let response = fetch::post_json(url, self.headers()?, &stats_request(username))?;
        let response = fetch::ensure_success("LeetCode", response)?;

        response.json::<Value>().map_err(LeetSyncError::Reqwest)
    }
}
