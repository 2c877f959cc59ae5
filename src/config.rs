use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PROVIDER_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_REFERER: &str = "http://localhost";
pub const DEFAULT_TITLE: &str = "TuBot";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// A credential that never shows up in logs.
#[derive(Clone, PartialEq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Which browser origins may call the API.
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

/// Settings for the completion provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// `None` when the credential is missing or blank. The relay then refuses
    /// every chat request.
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub referer: String,
    pub title: String,
    pub max_tokens: u32,
}

impl ProviderConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Settings for the backend-as-a-service (auth + chatbot table).
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub api_key: Option<ApiKey>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upstream_timeout: Duration,
    pub allowed_origins: AllowedOrigins,
    pub provider: ProviderConfig,
    pub supabase: SupabaseConfig,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = parse_or(&non_blank, "PORT", 8000u16)?;
        let max_tokens = parse_or(&non_blank, "MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        let timeout_secs = parse_or(&non_blank, "UPSTREAM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "UPSTREAM_TIMEOUT_SECS",
                value: "0".into(),
            });
        }

        let origins = non_blank("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string());

        Ok(Self {
            host: non_blank("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            upstream_timeout: Duration::from_secs(timeout_secs),
            allowed_origins: parse_origins(&origins),
            provider: ProviderConfig {
                api_key: non_blank("OPENROUTER_API_KEY").map(ApiKey::new),
                base_url: non_blank("OPENROUTER_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string()),
                referer: non_blank("OPENROUTER_REFERER")
                    .unwrap_or_else(|| DEFAULT_REFERER.to_string()),
                title: non_blank("OPENROUTER_TITLE").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                max_tokens,
            },
            supabase: SupabaseConfig {
                url: non_blank("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
                api_key: non_blank("SUPABASE_API_KEY").map(ApiKey::new),
            },
        })
    }

    /// Builds the outbound HTTP client shared by every upstream call.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.upstream_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_origins(raw: &str) -> AllowedOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();

    if origins.iter().any(|o| o == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}
