//! Dashboard configuration

use std::time::Duration;

use url::Url;

use super::cache::CacheConfig;
use super::retry::RetryConfig;
use crate::ports::QueryFamily;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_STALE_TIME_SECS: u64 = 300;
pub const DEFAULT_PRIORITY_LIST_STALE_TIME_SECS: u64 = 0;
pub const DEFAULT_FETCH_RETRIES: u32 = 1;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_PAGE_SIZE: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Dashboard configuration loaded from environment
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL every REST path is joined to
    pub api_url: Url,
    /// Per-request timeout of the HTTP client
    pub request_timeout: Duration,
    /// Freshness window of cached queries
    pub stale_time: Duration,
    /// Freshness window of priority-list pages, which go stale immediately
    /// by default
    pub priority_list_stale_time: Duration,
    /// Retries for failed background fetches
    pub fetch_retries: u32,
    /// Delay before the first fetch retry, doubled on each further one
    pub retry_base_delay: Duration,
    /// Rows per priority-list page
    pub page_size: u32,
    /// Assistant webhook; the assistant is disabled when unset
    pub assistant_webhook_url: Option<Url>,
}

impl DashboardConfig {
    /// Load configuration from environment variables (after `.env`, if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let (api_var, api_raw) = match (var("PROMETEO_API_URL"), var("VITE_API_URL")) {
            (Some(url), _) => ("PROMETEO_API_URL", url),
            (None, Some(url)) => ("VITE_API_URL", url),
            (None, None) => ("PROMETEO_API_URL", DEFAULT_API_URL.to_string()),
        };
        let api_url = parse_url(api_var, &api_raw)?;

        let assistant_webhook_url = var("PROMETEO_ASSISTANT_WEBHOOK_URL")
            .map(|raw| parse_url("PROMETEO_ASSISTANT_WEBHOOK_URL", &raw))
            .transpose()?;

        let number = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match var(name) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNumber {
                        var: name,
                        value: raw.clone(),
                    }),
            }
        };
        let narrow = |name: &'static str, value: u64| -> Result<u32, ConfigError> {
            u32::try_from(value).map_err(|_| ConfigError::InvalidNumber {
                var: name,
                value: value.to_string(),
            })
        };

        let page_size = narrow(
            "PROMETEO_PAGE_SIZE",
            number("PROMETEO_PAGE_SIZE", DEFAULT_PAGE_SIZE.into())?,
        )?;
        if page_size == 0 {
            return Err(ConfigError::InvalidNumber {
                var: "PROMETEO_PAGE_SIZE",
                value: "0".into(),
            });
        }

        Ok(Self {
            api_url,
            request_timeout: Duration::from_millis(number(
                "PROMETEO_REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            )?),
            stale_time: Duration::from_secs(number(
                "PROMETEO_STALE_TIME_SECS",
                DEFAULT_STALE_TIME_SECS,
            )?),
            priority_list_stale_time: Duration::from_secs(number(
                "PROMETEO_PRIORITY_LIST_STALE_TIME_SECS",
                DEFAULT_PRIORITY_LIST_STALE_TIME_SECS,
            )?),
            fetch_retries: narrow(
                "PROMETEO_FETCH_RETRIES",
                number("PROMETEO_FETCH_RETRIES", DEFAULT_FETCH_RETRIES.into())?,
            )?,
            retry_base_delay: Duration::from_millis(number(
                "PROMETEO_RETRY_BASE_DELAY_MS",
                DEFAULT_RETRY_BASE_DELAY_MS,
            )?),
            page_size,
            assistant_webhook_url,
        })
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            stale_time: self.stale_time,
            retry: RetryConfig {
                max_retries: self.fetch_retries,
                base_delay_ms: u64::try_from(self.retry_base_delay.as_millis())
                    .unwrap_or(u64::MAX),
                ..RetryConfig::default()
            },
            ..CacheConfig::default()
        }
        .with_family_stale_time(QueryFamily::PriorityList, self.priority_list_stale_time)
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { var, source })
}
