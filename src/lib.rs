//! Library interface for the toolbox package manager
//!
//! The CLI in `main.rs` is a thin layer over [`PackageManager`]; everything it
//! does is available here for scripting and tests.

pub mod catalog;
pub mod checksum;
pub mod colors;
pub mod commands;
pub mod confirm;
pub mod download;
pub mod error;
pub mod package_manager;
pub mod paths;
pub mod platform;
pub mod progress;
pub mod record;
pub mod shortcut;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogStore, DEFAULT_CATALOG_URL, PackageDescriptor};
pub use confirm::{AssumeYes, Confirm, StdinConfirm};
pub use download::{Fetcher, HttpFetcher};
pub use error::{Result, ToolboxError};
pub use package_manager::{
    InstallOutcome, InstallResult, PackageManager, Reporter, UninstallOutcome, UninstallResult,
    WILDCARD,
};
pub use paths::Paths;
pub use platform::Platform;
pub use record::{InstallRecord, InstalledOn, RecordStore};
pub use shortcut::{DesktopShortcut, ShortcutRegistrar};
