use crate::error::ConfigError;
use config::Environment;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, DatabaseConfig, ServerConfig};

const ENV_PREFIX: &str = "SRMS";

/// Loads the application configuration.
///
/// Sources are layered, later ones winning: built-in defaults, the TOML file
/// at `path` (optional), `SRMS__SECTION__KEY` environment variables, and
/// finally `DATABASE_URL`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with(
        path,
        Environment::with_prefix(ENV_PREFIX).separator("__"),
        std::env::var("DATABASE_URL").ok(),
    )
}

fn load_config_with(
    path: &Path,
    environment: Environment,
    database_url: Option<String>,
) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080_i64)?
        .set_default("server.workers", 10_i64)?
        .set_default("server.static_dir", "frontend")?
        .set_default("database.url", "")?
        .add_source(config::File::from(path).required(false))
        .add_source(environment)
        .set_override_option("database.url", database_url)?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    if config.database.url.is_empty() {
        tracing::warn!("No database URL configured; students will be kept in memory only.");
    }

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.workers == 0 {
        return Err(ConfigError::ValidationError(
            "server.workers must be at least 1".to_string(),
        ));
    }
    if config.server.static_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "server.static_dir must not be empty".to_string(),
        ));
    }
    Ok(())
}
