use crate::error::{FollowDiffError, Result};
use crate::extractor::DEFAULT_PROFILE_HOST;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "followdiff.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(rename = "Paths", default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Last-used input files. An empty string means "not selected".
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default)]
    pub followers: String,
    #[serde(default)]
    pub following: String,
    #[serde(default)]
    pub whitelist: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,
    #[serde(default = "default_auto_save_dir")]
    pub auto_save_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProfileConfig {
    #[serde(default = "default_profile_host")]
    pub host: String,
}

fn default_auto_save() -> bool {
    true
}

fn default_auto_save_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_profile_host() -> String {
    DEFAULT_PROFILE_HOST.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            auto_save: default_auto_save(),
            auto_save_dir: default_auto_save_dir(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            host: default_profile_host(),
        }
    }
}

impl PathsConfig {
    pub fn followers(&self) -> Option<PathBuf> {
        non_empty_path(&self.followers)
    }

    pub fn following(&self) -> Option<PathBuf> {
        non_empty_path(&self.following)
    }

    pub fn whitelist(&self) -> Option<PathBuf> {
        non_empty_path(&self.whitelist)
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FollowDiffError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| FollowDiffError::Config {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| FollowDiffError::Config {
                message: format!("Failed to parse config file {}: {}", path.display(), e),
            })?;

        Ok(config)
    }

    /// Load the config at `path`, or start from defaults when it has not
    /// been written yet.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn resolve_path(config_path: Option<&Path>) -> PathBuf {
        config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// The settings for one run: a copy with `overrides` applied, validated.
    /// `self` stays as it should be written back to disk.
    pub fn effective(&self, overrides: &CliOverrides) -> Result<Config> {
        let mut config = self.clone();
        config.merge_with_cli_args(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if cli_args.no_auto_save {
            self.output.auto_save = false;
        }

        if let Some(ref dir) = cli_args.auto_save_dir {
            self.output.auto_save_dir = dir.clone();
        }

        if let Some(ref host) = cli_args.profile_host {
            self.profile.host = host.clone();
        }
    }

    pub fn record_followers(&mut self, path: &Path) {
        self.paths.followers = path_string(path);
    }

    pub fn record_following(&mut self, path: &Path) {
        self.paths.following = path_string(path);
    }

    pub fn record_whitelist(&mut self, path: &Path) {
        self.paths.whitelist = path_string(path);
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| FollowDiffError::Config {
                message: format!("Failed to serialize config: {}", e),
            })?;

        std::fs::write(path, content)
            .map_err(|e| FollowDiffError::Config {
                message: format!("Failed to write config file {}: {}", path.display(), e),
            })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let host = self.profile.host.trim();
        if host.is_empty() {
            return Err(FollowDiffError::Config {
                message: "Profile host must not be empty".to_string(),
            });
        }

        if host.contains('/') && !host.ends_with('/') {
            return Err(FollowDiffError::Config {
                message: format!("Profile host must be a bare domain, got '{}'", host),
            });
        }

        let dir = &self.output.auto_save_dir;
        if dir.exists() && !dir.is_dir() {
            return Err(FollowDiffError::Config {
                message: format!("Auto-save location is not a directory: {}", dir.display()),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub no_auto_save: bool,
    pub auto_save_dir: Option<PathBuf>,
    pub profile_host: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_no_auto_save(mut self, no_auto_save: bool) -> Self {
        self.no_auto_save = no_auto_save;
        self
    }

    pub fn with_auto_save_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.auto_save_dir = dir;
        self
    }

    pub fn with_profile_host(mut self, host: Option<String>) -> Self {
        self.profile_host = host;
        self
    }
}
