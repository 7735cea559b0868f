use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::fields::BackgroundFieldMode;

pub const DEFAULT_CONFIG_FILE: &str = "chargen.toml";
pub const DEFAULT_TABLES_DIR: &str = "tables";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChargenConfig {
    /// Directory holding the `<table>.json` content files.
    pub tables_dir: PathBuf,
    /// Sheet template; the built-in standard sheet is used when unset.
    pub template: Option<PathBuf>,
    pub background_field: BackgroundFieldMode,
    /// Ask viewers to redraw filled values instead of hiding them.
    pub need_appearances: bool,
    /// Fixed RNG seed for reproducible rolls.
    pub seed: Option<u64>,
}

impl Default for ChargenConfig {
    fn default() -> Self {
        Self {
            tables_dir: PathBuf::from(DEFAULT_TABLES_DIR),
            template: None,
            background_field: BackgroundFieldMode::default(),
            need_appearances: true,
            seed: None,
        }
    }
}

impl ChargenConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        toml::from_str(content)
            .map_err(|e| CoreError::new(CoreErrorCode::Config, format!("invalid config: {e}")))
    }

    /// Reads a TOML config. A missing file yields the defaults; relative
    /// paths inside the file resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(CoreError::new(
                    CoreErrorCode::Io,
                    format!("failed to read {}: {e}", path.display()),
                ));
            }
        };

        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.tables_dir = base.join(&config.tables_dir);
            config.template = config.template.map(|template| base.join(template));
        }
        Ok(config)
    }
}
