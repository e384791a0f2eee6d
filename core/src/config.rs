//! API client configuration.
//!
//! Configuration is resolved once at process start and handed to
//! `ApiClient::new`; nothing in the crate reads the environment on its own.

use thiserror::Error;

/// Base URL used when `BRANCH_API_DEV` is set; matches the mock server's
/// default listen address.
pub const DEV_BASE_URL: &str = "http://127.0.0.1:3000";

pub const ENV_DEV: &str = "BRANCH_API_DEV";
pub const ENV_URL: &str = "BRANCH_API_URL";
pub const ENV_TOKEN: &str = "BRANCH_API_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
}

/// Where the branch API lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL every relative request path is joined to.
    pub base_url: String,

    /// Bearer token. `None` sends no `Authorization` header.
    pub token: Option<String>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Set the bearer token. An empty token is treated as no token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` in place of the process environment.
    ///
    /// Development mode (`BRANCH_API_DEV` set to anything but `""`, `0` or
    /// `false`) targets `DEV_BASE_URL`; otherwise `BRANCH_API_URL` is
    /// required. `BRANCH_API_TOKEN` is optional in both modes.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dev = lookup(ENV_DEV).is_some_and(|v| is_truthy(&v));
        let base_url = if dev {
            DEV_BASE_URL.to_string()
        } else {
            lookup(ENV_URL)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar(ENV_URL))?
        };
        let mut config = Self::new(base_url);
        if let Some(token) = lookup(ENV_TOKEN) {
            config = config.with_token(token);
        }
        Ok(config)
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "0" | "false")
}
