use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which feedback strategy a deployment uses. Never mixed within one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackMode {
    Local,
    Remote,
}

impl std::str::FromStr for FeedbackMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(FeedbackMode::Local),
            "remote" => Ok(FeedbackMode::Remote),
            other => bail!("FEEDBACK_MODE must be 'local' or 'remote', got '{other}'"),
        }
    }
}

/// Editor configuration loaded from environment variables.
/// Every variable is optional; malformed values fail at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub http_timeout: Duration,
    pub autosave_interval: Duration,
    pub autosave_enabled: bool,
    pub feedback_mode: FeedbackMode,
    pub feedback_debounce: Duration,
    pub default_template: String,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            http_timeout: Duration::from_secs(30),
            autosave_interval: Duration::from_secs(30),
            autosave_enabled: true,
            feedback_mode: FeedbackMode::Local,
            feedback_debounce: Duration::from_millis(300),
            default_template: "professional".to_string(),
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Split out of `from_env`
    /// so parsing can be tested without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let api_base_url = lookup("RESUSCAN_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        Ok(Config {
            api_base_url,
            http_timeout: parse_secs(&lookup, "HTTP_TIMEOUT_SECS")?
                .unwrap_or(defaults.http_timeout),
            autosave_interval: parse_secs(&lookup, "AUTOSAVE_INTERVAL_SECS")?
                .unwrap_or(defaults.autosave_interval),
            autosave_enabled: lookup("AUTOSAVE_ENABLED")
                .map(|v| parse_bool(&v))
                .transpose()
                .context("AUTOSAVE_ENABLED must be true or false")?
                .unwrap_or(defaults.autosave_enabled),
            feedback_mode: lookup("FEEDBACK_MODE")
                .map(|v| v.parse::<FeedbackMode>())
                .transpose()?
                .unwrap_or(defaults.feedback_mode),
            feedback_debounce: lookup("FEEDBACK_DEBOUNCE_MS")
                .map(|v| v.trim().parse::<u64>().map(Duration::from_millis))
                .transpose()
                .context("FEEDBACK_DEBOUNCE_MS must be a whole number of milliseconds")?
                .unwrap_or(defaults.feedback_debounce),
            default_template: lookup("DEFAULT_TEMPLATE").unwrap_or(defaults.default_template),
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of seconds"))?;
    if secs == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Some(Duration::from_secs(secs)))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: '{other}'"),
    }
}
