use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolboxError {
    #[error("Package list not found at {}. Try updating the package list using the 'update' command.", .0.display())]
    CatalogMissing(PathBuf),

    #[error("Package list at {} is invalid: {reason}", path.display())]
    CatalogCorrupt { path: PathBuf, reason: String },

    #[error("Failed to download package list from {url}: {reason}")]
    CatalogUnavailable { url: String, reason: String },

    #[error("Package '{name}' not found in the package list.{}", suggestion_suffix(.suggestion))]
    PackageNotFound {
        name: String,
        suggestion: Option<String>,
    },

    #[error("'{name}' is not available for your platform ({platform}).")]
    UnsupportedPlatform { name: String, platform: String },

    #[error("Checksum mismatch for {name}. Installation aborted.")]
    IntegrityFailure {
        name: String,
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("'{0}' is not a valid package name.")]
    InvalidPackageName(String),

    #[error("Package '{0}' is not installed.")]
    NotInstalled(String),

    #[error("An error occurred while uninstalling '{name}': {source}. Please try again.")]
    UninstallFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not create a shortcut for '{name}': {reason}")]
    ShortcutFailure { name: String, reason: String },

    #[error("Download failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" Did you mean '{}'?", s),
        None => String::new(),
    }
}

impl ToolboxError {
    /// Advisory errors are reported as warnings and never fail a command.
    pub fn is_advisory(&self) -> bool {
        matches!(self, ToolboxError::ShortcutFailure { .. })
    }

    /// Process exit status for one-shot invocations.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolboxError::ShortcutFailure { .. } => 0,
            ToolboxError::PackageNotFound { .. }
            | ToolboxError::UnsupportedPlatform { .. }
            | ToolboxError::InvalidPackageName(_)
            | ToolboxError::NotInstalled(_) => 2,
            ToolboxError::IntegrityFailure { .. } => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolboxError>;
