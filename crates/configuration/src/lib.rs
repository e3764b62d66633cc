use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod catalog;
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use catalog::{CategoryCatalog, CategoryStyle};
pub use logging::init_logging;
pub use settings::{BackendConfig, ConfigOverrides, EngineConfig, LoggingConfig};

/// The file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Loads the application configuration from the `config.toml` file, if present.
///
/// Sources are layered, later ones winning: built-in defaults, the optional
/// `config.toml`, then environment variables such as
/// `FINBOARD__BACKEND__BASE_URL`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new(DEFAULT_CONFIG_FILE), false)
}

/// Same as [`load_config`] for an explicit file. With `required` set, a
/// missing file is an error instead of being skipped.
pub fn load_config_from(path: &Path, required: bool) -> Result<Config, ConfigError> {
    load_layered(path, required, environment())
}

/// The `FINBOARD__SECTION__KEY` environment layer.
fn environment() -> config::Environment {
    config::Environment::with_prefix("FINBOARD")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn load_layered(
    path: &Path,
    required: bool,
    env: config::Environment,
) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(config::File::from(path).required(required))
        .add_source(env)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(file = %path.display(), required, "configuration loaded");
    Ok(config)
}
