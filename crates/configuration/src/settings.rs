use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub portfolio: PortfolioConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for the market-data service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// The free test environment. Returns scrambled data.
    pub sandbox: TargetConfig,
    /// The paid environment serving real data.
    pub production: TargetConfig,
    /// Upper bound on batch requests in flight when a symbol list is split
    /// into several chunks.
    pub max_concurrent_requests: usize,
}

/// One service environment as it appears in the configuration sources.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Where the list of watched symbols lives.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Directory of the append-only log file.
    pub directory: PathBuf,
    pub file_name: String,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

/// Which service environment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Sandbox,
    Production,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Sandbox => write!(f, "SandBox"),
            Mode::Production => write!(f, "Production"),
        }
    }
}

/// A fully resolved environment: base URL plus the access token to append to every request.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiTarget {
    pub base_url: String,
    pub token: String,
}

// The token must never end up in logs.
impl fmt::Debug for ApiTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiTarget")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Settings {
    /// Resolves the environment selected by `mode`.
    ///
    /// Fails if that environment has no access token configured.
    pub fn target(&self, mode: Mode) -> Result<ApiTarget, ConfigError> {
        let target = match mode {
            Mode::Sandbox => &self.api.sandbox,
            Mode::Production => &self.api.production,
        };

        let token = target
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ConfigError::ValidationError(format!("no access token configured for {mode} mode"))
            })?;

        if target.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "no base_url configured for {mode} mode"
            )));
        }

        Ok(ApiTarget {
            base_url: target.base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }
}
