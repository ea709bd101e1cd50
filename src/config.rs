// src/config.rs
use crate::error::DashboardError;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_POLL_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub poll_interval: Duration,
    /// `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            request_timeout: None,
        }
    }
}

impl Config {
    /// Reads `DASHBOARD_*` variables, loading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self, DashboardError> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(key, _)| key.starts_with("DASHBOARD_"))
            .collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, DashboardError> {
        let mut config = Config::default();

        if let Some(url) = vars.get("DASHBOARD_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                return Err(DashboardError::validation("DASHBOARD_URL is empty"));
            }
            config.base_url = url.to_string();
        }
        if let Some(secs) = vars.get("DASHBOARD_POLL_SECS") {
            let secs = parse_secs("DASHBOARD_POLL_SECS", secs)?;
            if secs == 0 {
                return Err(DashboardError::validation(
                    "DASHBOARD_POLL_SECS must be greater than zero",
                ));
            }
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = vars.get("DASHBOARD_TIMEOUT_SECS") {
            config.request_timeout =
                Some(Duration::from_secs(parse_secs("DASHBOARD_TIMEOUT_SECS", secs)?));
        }

        Ok(config)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, DashboardError> {
    raw.trim()
        .parse()
        .map_err(|_| DashboardError::validation(format!("{} must be a whole number of seconds", key)))
}
