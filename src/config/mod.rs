//! Builds the `AppConfig` from layered TOML files: `config/base.toml`
//! overlaid with `config/{APP_ENVIRONMENT}.toml`. Initialized exactly once
//! behind a `OnceLock`; every caller after the first gets the same reference.

mod data;

use std::sync::OnceLock;
use tracing::{error, info};

use data::Environment;

// Re-export config structs
pub use data::{AppConfig, ConfigError, ConfigResult, DbConfig, NetConfig, SslRequire};

/// Returns the application configuration, reading it from disk on first use.
///
/// Panics when the config files are broken or unreadable. A missing database
/// section is deliberately not fatal: the app keeps serving and reports a
/// configuration error on every submission instead.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!("{:<12} - Initializing the configuration", "init_config");

        let base_path = std::env::current_dir().expect("Failed to determine the current DIR.");
        let config_dir = base_path.join("config");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .expect("Failed to parse APP_ENVIRONMENT.");
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let base_file = std::fs::File::open(config_dir.join("base.toml"))
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"));
        let env_file = std::fs::File::open(config_dir.join(environment_filename))
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"));

        let mut config = AppConfig::init()
            .add_source_file(base_file)
            .add_source_file(env_file)
            .build()
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"));

        // In production the database is configured through the environment,
        // never through files.
        if matches!(environment, Environment::Production) {
            config.db_config = match std::env::var("DATABASE_URL") {
                Ok(db_url) => match DbConfig::try_from(db_url.as_str()) {
                    Ok(db_config) => Some(db_config),
                    Err(er) => {
                        error!(
                            "{:<12} - DATABASE_URL could not be parsed: {er}",
                            "init_config"
                        );
                        None
                    }
                },
                Err(_) => {
                    error!(
                        "{:<12} - DATABASE_URL environment variable is not set",
                        "init_config"
                    );
                    None
                }
            };
        }

        config
    })
}
