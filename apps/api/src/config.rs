use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Default number of tasks in one interview.
pub const DEFAULT_TASK_COUNT: usize = 5;

/// Default minutes an interview may sit untouched before it is evicted.
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Number of tasks an interview runs before the final report.
    pub task_count: usize,
    /// Directory that receives the generated per-task CSV datasets.
    pub dataset_dir: PathBuf,
    /// Seed for reproducible task selection. Unset means a fresh random order per interview.
    pub task_seed: Option<u64>,
    /// Minutes without any request after which an interview and its dataset are dropped.
    pub session_idle_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let task_count = match std::env::var("INTERVIEW_TASK_COUNT") {
            Ok(raw) => raw
                .parse::<usize>()
                .context("INTERVIEW_TASK_COUNT must be a positive integer")?,
            Err(_) => DEFAULT_TASK_COUNT,
        };
        if task_count == 0 {
            bail!("INTERVIEW_TASK_COUNT must be at least 1");
        }

        let session_idle_minutes = match std::env::var("SESSION_IDLE_MINUTES") {
            Ok(raw) => raw
                .parse::<i64>()
                .context("SESSION_IDLE_MINUTES must be an integer")?,
            Err(_) => DEFAULT_SESSION_IDLE_MINUTES,
        };
        if session_idle_minutes < 1 {
            bail!("SESSION_IDLE_MINUTES must be at least 1");
        }

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            task_count,
            dataset_dir: std::env::var("DATASET_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("interviewer-datasets")),
            task_seed: std::env::var("INTERVIEW_SEED")
                .ok()
                .map(|raw| raw.parse::<u64>())
                .transpose()
                .context("INTERVIEW_SEED must be an unsigned integer")?,
            session_idle_minutes,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
