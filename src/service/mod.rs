pub use github::{GithubClient, Hosting};
pub use leetcode::{Leetcode, StatsProvider};
pub use publish::Published;

pub mod git;
pub mod github;
pub mod leetcode;
pub mod publish;
pub mod setup;
pub mod update;
