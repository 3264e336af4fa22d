//! Player option persistence
//!
//! Re-exports the shared option types and provides loading from an explicit
//! TOML file or from the per-user configuration store.

mod error;

use std::path::Path;

pub use error::ConfigError;
pub use labelplay_types::{InteractionMode, LabelFilter, MediaKind, PlayerOptions};

const APP_NAME: &str = "labelplay";
const CONFIG_NAME: &str = "options";

/// Extension trait for PlayerOptions persistence
pub trait PlayerOptionsExt: Sized {
    /// Load from the user store, falling back to defaults
    fn load() -> Self;
    /// Load from an explicit TOML file
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    /// Persist to the user store
    fn save(&self) -> Result<(), ConfigError>;
}

impl PlayerOptionsExt for PlayerOptions {
    fn load() -> Self {
        match confy::load::<PlayerOptions>(APP_NAME, CONFIG_NAME) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load stored options, using defaults");
                PlayerOptions::default()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        parse_options(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }
}

/// Parse options from TOML text; missing fields take their defaults.
pub fn parse_options(text: &str) -> Result<PlayerOptions, toml::de::Error> {
    toml::from_str(text)
}
