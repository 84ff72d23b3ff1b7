//! Configuration for the Supabase client
//!
//! Supports environment-based configuration with builder overrides.

use crate::error::{ApiError, ApiResult};
use std::env;
use std::time::Duration;

/// Local Supabase stack started by `supabase start`
const DEVELOPMENT_URL: &str = "http://localhost:54321";

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development (typically localhost Supabase)
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse from environment variable
    pub fn from_env() -> Self {
        match env::var("SMOKESPOT_ENV")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Supabase project URL (without `/rest/v1`)
    pub url: String,
    /// Supabase anonymous key, sent as `apikey` on every request
    pub anon_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Current environment
    pub environment: Environment,
}

/// First set variable among `names`
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
}

impl ClientConfig {
    /// Create a configuration for a project URL and anon key
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            timeout: Duration::from_secs(30),
            environment: Environment::default(),
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `SMOKESPOT_SUPABASE_URL`, `SUPABASE_URL` or `EXPO_PUBLIC_SUPABASE_URL`: project URL
    /// - `SMOKESPOT_SUPABASE_ANON_KEY`, `SUPABASE_ANON_KEY` or `EXPO_PUBLIC_SUPABASE_ANON_KEY`: anon key
    /// - `SMOKESPOT_ENV`: Environment (development/staging/production)
    /// - `SMOKESPOT_TIMEOUT_SECS`: Request timeout in seconds
    pub fn from_env() -> ApiResult<Self> {
        let environment = Environment::from_env();

        let url = first_env(&["SMOKESPOT_SUPABASE_URL", "SUPABASE_URL", "EXPO_PUBLIC_SUPABASE_URL"])
            .or_else(|| (environment == Environment::Development).then(|| DEVELOPMENT_URL.to_string()))
            .ok_or_else(|| ApiError::missing_env("SUPABASE_URL"))?;

        let anon_key = first_env(&[
            "SMOKESPOT_SUPABASE_ANON_KEY",
            "SUPABASE_ANON_KEY",
            "EXPO_PUBLIC_SUPABASE_ANON_KEY",
        ])
        .ok_or_else(|| ApiError::missing_env("SUPABASE_ANON_KEY"))?;

        let timeout = env::var("SMOKESPOT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(Duration::from_secs(30), Duration::from_secs);

        Ok(Self::new(url, anon_key)
            .with_timeout(timeout)
            .with_environment(environment))
    }

    /// PostgREST base URL
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    /// GoTrue base URL
    #[must_use]
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the environment
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.url.is_empty() {
            return Err(ApiError::config("url cannot be empty"));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ApiError::config("url must start with http:// or https://"));
        }

        if self.anon_key.trim().is_empty() {
            return Err(ApiError::config("anon_key cannot be empty"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}
