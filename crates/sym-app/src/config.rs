use std::env;
use std::str::FromStr;
use std::time::Duration;
use anyhow::Context;
use crate::generator::{PollOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_TIMEOUT_MS};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub poll_interval_ms: u64,
    pub poll_timeout_ms: u64,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Reads `SYM_*` variables, after loading `.env` if there is one.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let api_base = lookup("SYM_API_BASE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_base);

        let poll_interval_ms = parse_var(&lookup, "SYM_POLL_INTERVAL_MS")?.unwrap_or(defaults.poll_interval_ms);
        let poll_timeout_ms = parse_var(&lookup, "SYM_POLL_TIMEOUT_MS")?.unwrap_or(defaults.poll_timeout_ms);
        let request_timeout = parse_var(&lookup, "SYM_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        if poll_interval_ms == 0 {
            anyhow::bail!("SYM_POLL_INTERVAL_MS must be greater than zero");
        }

        Ok(Self {
            api_base,
            poll_interval_ms,
            poll_timeout_ms,
            request_timeout,
        })
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions::from_millis(self.poll_interval_ms, self.poll_timeout_ms)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("{} must be a number, got '{}'", key, raw)))
        .transpose()
}
