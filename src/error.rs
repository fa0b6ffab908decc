use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FollowDiffError {
    #[error("IO operation failed on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid search pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("No {which} file selected")]
    MissingInput { which: &'static str },

    #[error("A comparison is already running")]
    ComparisonInProgress,

    #[error("Comparison worker failed: {message}")]
    Worker { message: String },

    #[error("No results to export")]
    NoResults,

    #[error("Invalid account identifier: {identifier}")]
    InvalidIdentifier { identifier: String },

    #[error("Failed to launch {tool}: {message}")]
    Launch { tool: String, message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl FollowDiffError {
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        FollowDiffError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse<P: AsRef<Path>, S: Into<String>>(path: P, message: S) -> Self {
        FollowDiffError::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for FollowDiffError {
    fn user_message(&self) -> String {
        match self {
            FollowDiffError::Io { path, source } => {
                format!("Failed to read or write {}: {}", display_name(path), source)
            }
            FollowDiffError::Parse { path, message } => {
                format!("Failed to read file {}: {}", display_name(path), message)
            }
            FollowDiffError::InvalidPattern { .. } => "Invalid regex".to_string(),
            FollowDiffError::MissingInput { .. } => {
                "Please select both Followers and Following files.".to_string()
            }
            FollowDiffError::NoResults => {
                "No results to export. Please compare files first.".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            FollowDiffError::Io { .. } => Some(
                "Check that the file exists and that you have permission to access it.".to_string()
            ),
            FollowDiffError::Parse { .. } => Some(
                "Use the followers/following files from your data export, in either HTML or JSON format.".to_string()
            ),
            FollowDiffError::InvalidPattern { .. } => Some(
                "Check the expression for unbalanced brackets or parentheses, or turn regex search off.".to_string()
            ),
            FollowDiffError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate it with --generate-config.".to_string()
            ),
            FollowDiffError::MissingInput { .. } => Some(
                "Pass --followers and --following, or select them once so they are remembered in the config file.".to_string()
            ),
            FollowDiffError::ComparisonInProgress => Some(
                "Wait for the running comparison to finish before starting another.".to_string()
            ),
            FollowDiffError::NoResults => Some(
                "Run a comparison that produces at least one result before exporting.".to_string()
            ),
            FollowDiffError::Launch { .. } => Some(
                "On Linux, install xdg-utils for opening profiles and xclip, xsel or wl-copy for the clipboard.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for FollowDiffError {
    fn from(error: toml::de::Error) -> Self {
        FollowDiffError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FollowDiffError>;

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
