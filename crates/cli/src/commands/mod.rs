pub mod ask;
pub mod check;
pub mod config_cmd;
pub mod exam;
pub mod serve;

use std::path::Path;

use answerline_config::{AppConfig, ConfigError};
use tracing::debug;

/// Load the config from `path` when given, else from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    debug!(path = ?path, "Loading configuration");
    match path {
        Some(path) => AppConfig::load_path(path),
        None => AppConfig::load(),
    }
}
