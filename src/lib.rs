pub use config::*;
pub use error::{LeetSyncError, Result};

pub mod cmd;
mod config;
mod error;
mod fetch;
pub mod icon;
pub mod model;
pub mod printer;
pub mod service;
pub mod template;
