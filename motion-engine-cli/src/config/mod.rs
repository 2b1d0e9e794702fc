use anyhow::{Context, Result};
use motion_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration stored at ~/.motion-engine/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

fn default_pretty_json() -> bool {
    true
}

fn default_show_progress() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty_json: default_pretty_json(),
            show_progress: default_show_progress(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".motion-engine").join("config.toml"))
    }

    /// Load from an explicit path, or from the default location, then
    /// apply engine overrides from the environment.
    /// A missing file yields the defaults.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config
            .engine
            .apply_env()
            .context("Invalid engine settings in environment")?;
        Ok(config)
    }

    /// Load the file alone, without environment overrides
    pub fn read_file(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config
            .engine
            .validate()
            .with_context(|| format!("Invalid engine settings in {:?}", path))?;

        Ok(config)
    }

    /// Save configuration to a path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
