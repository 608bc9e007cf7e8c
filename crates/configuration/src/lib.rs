use crate::error::ConfigError;
use std::env;
use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod logging;
pub mod portfolio;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use cli::ModeArgs;
pub use logging::init_logging;
pub use portfolio::{load_portfolio, parse_portfolio};
pub use settings::{
    ApiConfig, ApiTarget, LoggingConfig, Mode, PortfolioConfig, Settings, TargetConfig,
};

/// Default location of the optional configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
/// Environment variable holding the sandbox access token.
pub const SANDBOX_TOKEN_VAR: &str = "IEX_CLOUD_TOKEN_SAND";
/// Environment variable holding the production access token.
pub const PRODUCTION_TOKEN_VAR: &str = "IEX_CLOUD_TOKEN";

const ENV_PREFIX: &str = "IEXSCOPE";
const SANDBOX_BASE_URL: &str = "https://sandbox.iexapis.com";
const PRODUCTION_BASE_URL: &str = "https://cloud.iexapis.com";

/// Loads the application configuration from `config.toml` and the environment.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(Path::new(DEFAULT_CONFIG_FILE))
}

/// Loads the application configuration with `path` as the configuration file.
///
/// Sources, lowest precedence first: built-in defaults, the file at `path`
/// (optional), `IEXSCOPE__*` environment variables, then the access tokens in
/// `IEX_CLOUD_TOKEN_SAND` and `IEX_CLOUD_TOKEN`.
pub fn load_config_from(path: &Path) -> Result<Settings, ConfigError> {
    build_settings(
        path,
        env::var(SANDBOX_TOKEN_VAR).ok(),
        env::var(PRODUCTION_TOKEN_VAR).ok(),
    )
}

fn build_settings(
    path: &Path,
    sandbox_token: Option<String>,
    production_token: Option<String>,
) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("api.sandbox.base_url", SANDBOX_BASE_URL)?
        .set_default("api.production.base_url", PRODUCTION_BASE_URL)?
        .set_default("api.max_concurrent_requests", 4_i64)?
        .set_default("portfolio.path", "portfolio.txt")?
        .set_default("logging.directory", ".")?
        .set_default("logging.file_name", "iexscope.log")?
        .set_default("logging.filter", "info")?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("api.sandbox.token", sandbox_token)?
        .set_override_option("api.production.token", production_token)?
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;

    if settings.api.max_concurrent_requests == 0 {
        return Err(ConfigError::ValidationError(
            "api.max_concurrent_requests must be at least 1".to_string(),
        ));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = build_settings(&dir.path().join("absent.toml"), None, None).unwrap();

        assert_eq!(settings.api.sandbox.base_url, SANDBOX_BASE_URL);
        assert_eq!(settings.api.production.base_url, PRODUCTION_BASE_URL);
        assert_eq!(settings.api.max_concurrent_requests, 4);
        assert_eq!(settings.portfolio.path, Path::new("portfolio.txt"));
        assert_eq!(settings.logging.file_name, "iexscope.log");
        assert!(settings.api.sandbox.token.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
            [api]
            max_concurrent_requests = 2

            [api.sandbox]
            base_url = "http://localhost:9000/"
            token = "Tsk_file"

            [portfolio]
            path = "watch.txt"
            "#,
        );

        let settings = build_settings(file.path(), None, None).unwrap();
        assert_eq!(settings.api.max_concurrent_requests, 2);
        assert_eq!(settings.portfolio.path, Path::new("watch.txt"));

        let target = settings.target(Mode::Sandbox).unwrap();
        assert_eq!(target.base_url, "http://localhost:9000");
        assert_eq!(target.token, "Tsk_file");
    }

    #[test]
    fn environment_tokens_win_over_file() {
        let file = write_config(
            r#"
            [api.production]
            base_url = "https://cloud.iexapis.com"
            token = "pk_file"
            "#,
        );

        let settings =
            build_settings(file.path(), Some("Tsk_env".into()), Some("pk_env".into())).unwrap();
        assert_eq!(settings.target(Mode::Production).unwrap().token, "pk_env");
        assert_eq!(settings.target(Mode::Sandbox).unwrap().token, "Tsk_env");
    }

    #[test]
    fn missing_token_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = build_settings(&dir.path().join("absent.toml"), None, None).unwrap();

        let err = settings.target(Mode::Production).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let file = write_config("[api]\nmax_concurrent_requests = 0\n");
        let err = build_settings(file.path(), None, None).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn target_debug_hides_token() {
        let target = ApiTarget {
            base_url: "https://sandbox.iexapis.com".to_string(),
            token: "Tsk_secret".to_string(),
        };
        let printed = format!("{target:?}");
        assert!(!printed.contains("Tsk_secret"));
        assert!(printed.contains("sandbox.iexapis.com"));
    }
}
