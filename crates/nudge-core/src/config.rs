//! Runtime configuration read from the process environment.
//!
//! The CLI loads an optional `.env` first; this module only looks variables
//! up. `from_lookup` takes the lookup as a function so tests never touch the
//! real environment.

use std::fmt;
use std::time::Duration;

use chrono::FixedOffset;
use thiserror::Error;

pub const DEFAULT_TARGET_URL: &str = "/whattodo/";
pub const DEFAULT_VAPID_SUBJECT: &str = "mailto:admin@example.com";
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    /// PostgREST base URL (e.g. `https://xyz.supabase.co`).
    pub store_url: String,
    /// Service role key; bypasses row level security.
    pub store_key: String,
    /// Raw base64url P-256 key for signing VAPID tokens. Selects direct
    /// Web Push delivery.
    pub vapid_private_key: Option<String>,
    /// Used only when no VAPID key is configured.
    pub gateway_url: Option<String>,
    pub gateway_token: Option<String>,
    pub vapid_subject: String,
    pub target_url: String,
    pub utc_offset: FixedOffset,
    pub concurrency: usize,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // empty values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store_url = get("SUPABASE_URL")
            .or_else(|| get("NEXT_PUBLIC_SUPABASE_URL"))
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let store_key = get("SUPABASE_SERVICE_ROLE_KEY")
            .or_else(|| get("SUPABASE_SERVICE_KEY"))
            .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;

        let offset_minutes: i32 = parse_or(
            "NOTIFY_UTC_OFFSET_MINUTES",
            get("NOTIFY_UTC_OFFSET_MINUTES"),
            0,
        )?;
        let utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                name: "NOTIFY_UTC_OFFSET_MINUTES",
                reason: format!("{offset_minutes} is outside +/-24h"),
            })?;

        let concurrency: usize = parse_or(
            "NOTIFY_CONCURRENCY",
            get("NOTIFY_CONCURRENCY"),
            DEFAULT_CONCURRENCY,
        )?;
        if concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "NOTIFY_CONCURRENCY",
                reason: "must be at least 1".to_string(),
            });
        }

        let timeout_secs: u64 = parse_or(
            "NOTIFY_HTTP_TIMEOUT_SECS",
            get("NOTIFY_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        Ok(Self {
            store_url,
            store_key,
            vapid_private_key: get("VAPID_PRIVATE_KEY"),
            gateway_url: get("PUSH_GATEWAY_URL"),
            gateway_token: get("PUSH_GATEWAY_TOKEN"),
            vapid_subject: get("VAPID_SUBJECT")
                .unwrap_or_else(|| DEFAULT_VAPID_SUBJECT.to_string()),
            target_url: get("NOTIFY_TARGET_URL")
                .unwrap_or_else(|| DEFAULT_TARGET_URL.to_string()),
            utc_offset,
            concurrency,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn require_vapid_private_key(&self) -> Result<&str, ConfigError> {
        self.vapid_private_key
            .as_deref()
            .ok_or(ConfigError::Missing("VAPID_PRIVATE_KEY"))
    }

    pub fn require_gateway_url(&self) -> Result<&str, ConfigError> {
        self.gateway_url
            .as_deref()
            .ok_or(ConfigError::Missing("PUSH_GATEWAY_URL"))
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("store_url", &self.store_url)
            .field("store_key", &"<redacted>")
            .field(
                "vapid_private_key",
                &self.vapid_private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("gateway_url", &self.gateway_url)
            .field("gateway_token", &self.gateway_token.as_ref().map(|_| "<redacted>"))
            .field("vapid_subject", &self.vapid_subject)
            .field("target_url", &self.target_url)
            .field("utc_offset", &self.utc_offset)
            .field("concurrency", &self.concurrency)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}
