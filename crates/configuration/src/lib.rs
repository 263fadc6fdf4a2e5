use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use std::env;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AppSettings, Config, DatabaseSettings, LoggingSettings, PASSWORD_COST_RANGE, SecuritySettings,
    ServerSettings,
};

/// The optional settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Loads the application configuration.
///
/// Sources are layered from lowest to highest priority: built-in defaults,
/// `config.toml` (optional), `ANIMEHEAVEN__SECTION__KEY` environment variables,
/// and finally the conventional `DATABASE_URL`, `PORT`, `FRONTEND_URL` and
/// `APP_ENV` variables. Call `dotenvy::dotenv()` first to pick up a `.env` file.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(Environment::with_prefix("ANIMEHEAVEN").separator("__"))
        .set_override_option("database.url", env::var("DATABASE_URL").ok())?
        .set_override_option("server.port", env::var("PORT").ok())?
        .set_override_option("server.frontend_url", env::var("FRONTEND_URL").ok())?
        .set_override_option("app.environment", env::var("APP_ENV").ok())?;

    finish(builder)
}

/// Builds a configuration from a TOML document only, ignoring the environment.
pub fn config_from_toml(toml: &str) -> Result<Config, ConfigError> {
    finish(config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    tracing::debug!(server = ?config.server, environment = %config.app.environment, "Configuration loaded.");
    Ok(config)
}
