use crate::{Error, Result};

/// Runtime configuration loaded from environment variables at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-lines file of bars replayed as the data feed.
    pub bars_path: String,

    /// Strategy config file path.
    pub strategy_config_path: String,

    /// Starting balance of the paper execution client.
    pub paper_balance: f64,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let paper_balance = match optional_env("PAPER_BALANCE") {
            Some(raw) => raw.parse::<f64>().map_err(|_| {
                Error::Config(format!("PAPER_BALANCE must be a number, got: '{raw}'"))
            })?,
            None => 10_000.0,
        };
        if paper_balance <= 0.0 {
            return Err(Error::Config(format!(
                "PAPER_BALANCE must be positive, got: {paper_balance}"
            )));
        }

        Ok(Config {
            bars_path: required_env("BARS_PATH")?,
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| "config/strategy.toml".to_string()),
            paper_balance,
        })
    }
}

fn required_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        Error::Config(format!(
            "Required environment variable '{key}' is not set. Check your .env file."
        ))
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
