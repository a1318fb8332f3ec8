//! Environment-driven service configuration.

use quiz_bank_types::StoreMode;
use std::collections::HashMap;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 10000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub mode: StoreMode,
    /// Fixed topic list served by `/topics` instead of the derived index.
    pub fixed_topics: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(std::env::vars().collect())
    }

    fn from_vars(vars: HashMap<String, String>) -> Result<Self, String> {
        let port = match vars.get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| format!("PORT must be a valid port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let mode = match vars.get("QUIZ_BANK_MODE") {
            Some(raw) => raw.parse()?,
            None => StoreMode::Preload,
        };

        Ok(Self {
            host: vars
                .get("QUIZ_BANK_HOST")
                .cloned()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_dir: vars
                .get("QUIZ_BANK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            mode,
            fixed_topics: vars.get("QUIZ_BANK_TOPICS").and_then(|s| parse_topic_list(s)),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split a comma-separated topic list, keeping the author's order.
/// Returns `None` when nothing but whitespace and commas was given.
fn parse_topic_list(raw: &str) -> Option<Vec<String>> {
    let topics: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if topics.is_empty() { None } else { Some(topics) }
}
