//! Layered CLI settings
//!
//! Precedence, lowest first: built-in defaults, the `--config` TOML file,
//! `AGORA__*` environment variables (`__` separates nested keys, e.g.
//! `AGORA__DEBATE__COMFORT=0.1`), then explicit command-line flags.

use std::path::{Path, PathBuf};

use agora_core::DebateConfig;
use agora_io::GeneratorConfig;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "AGORA";

/// Everything the CLI can be configured with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub debate: DebateConfig,
    pub generator: GeneratorConfig,
    /// Base folder holding `debate_<n>` results
    pub results_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debate: DebateConfig::default(),
            generator: GeneratorConfig::default(),
            results_dir: PathBuf::from("results"),
        }
    }
}

impl Settings {
    /// Defaults, then `file` if given, then the environment
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
