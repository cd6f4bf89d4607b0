//! On-disk layout of the package manager's data directory.
//!
//! Everything lives under a shared vendor directory inside the platform's
//! application-data location:
//!
//! ```text
//! <app data>/ravendevteam/
//!   toolbox/packages.json   # cached catalog
//!   record.json             # installation records
//!   <package>/              # one directory per installed package
//! ```
//!
//! The root can be overridden with `TOOLBOX_HOME` (or `--home`), which is how
//! tests and sandboxed runs keep away from the real user profile.

use crate::error::{Result, ToolboxError};
use crate::platform::Platform;
use std::path::{Path, PathBuf};

pub const VENDOR_DIR: &str = "ravendevteam";
pub const APP_DIR: &str = "toolbox";
pub const CATALOG_FILE: &str = "packages.json";
pub const RECORD_FILE: &str = "record.json";

/// Resolved locations for catalog, records, and package installs.
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    /// Use an explicit vendor root (the directory that holds `record.json`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the vendor root for a platform, honouring `TOOLBOX_HOME`.
    pub fn detect(platform: &Platform) -> Self {
        if let Some(home) = std::env::var_os("TOOLBOX_HOME") {
            return Self::new(home);
        }
        Self::new(default_app_data(platform).join(VENDOR_DIR))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_file(&self) -> PathBuf {
        self.root.join(APP_DIR).join(CATALOG_FILE)
    }

    pub fn record_file(&self) -> PathBuf {
        self.root.join(RECORD_FILE)
    }

    /// Installation directory for a package. Not versioned: reinstalling a
    /// newer release reuses the same location.
    pub fn install_dir(&self, name: &str) -> Result<PathBuf> {
        validate_package_name(name)?;
        Ok(self.root.join(name))
    }

    /// Existing installation directory for `name`.
    ///
    /// The exact spelling wins; otherwise the first directory under the root
    /// whose name matches ignoring case. Installs are stored under the
    /// catalog's spelling, which need not be what the user typed.
    pub fn find_install_dir(&self, name: &str) -> Result<Option<PathBuf>> {
        let exact = self.install_dir(name)?;
        if exact.exists() {
            return Ok(Some(exact));
        }

        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut matches: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter(|entry| {
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();
                validate_package_name(&file_name).is_ok() && same_package_name(&file_name, name)
            })
            .map(|entry| entry.path())
            .collect();
        matches.sort();

        Ok(matches.into_iter().next())
    }
}

/// Package names compare equal ignoring case (full Unicode folding).
pub fn same_package_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Reject names that would resolve outside the vendor root or onto the
/// manager's own files.
pub fn validate_package_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', ':'])
        || same_package_name(name, APP_DIR)
        || same_package_name(name, RECORD_FILE);

    if invalid {
        return Err(ToolboxError::InvalidPackageName(name.to_string()));
    }
    Ok(())
}

fn default_app_data(platform: &Platform) -> PathBuf {
    let home = || std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));

    if platform.is_windows() {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata);
        }
        if let Some(home) = home() {
            return PathBuf::from(home).join("AppData").join("Roaming");
        }
    } else if platform.is_macos() {
        if let Some(home) = home() {
            return PathBuf::from(home).join("Library/Application Support");
        }
    } else {
        if let Some(data_home) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(data_home);
        }
        if let Some(home) = home() {
            return PathBuf::from(home).join(".local/share");
        }
    }

    PathBuf::from(".")
}
