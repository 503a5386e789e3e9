use crate::errors::{Error, Result};
use std::path::PathBuf;

pub const DEFAULT_DATABASE_PATH: &str = "fintrack.db";
pub const DEFAULT_LOG_FILTER: &str = "fintrack=info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub user_id: Option<String>,
    pub log_filter: String,
}

impl Config {
    /// Flags and environment have already been merged by the command-line
    /// parser; this fills in defaults for whatever is still missing.
    pub fn new(
        database_path: Option<PathBuf>,
        user_id: Option<String>,
        log_filter: Option<String>,
    ) -> Self {
        Self {
            database_path: database_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            user_id: user_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            log_filter: log_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    pub fn require_user(&self) -> Result<&str> {
        self.user_id.as_deref().ok_or_else(|| {
            Error::Config("no user given; pass --user or set FINTRACK_USER".to_string())
        })
    }
}

/// Reads `.env` from the working directory if one exists.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}
