//! Installation records: which packages are installed, at what version, and when.
//!
//! Records live in a single JSON file next to the package directories:
//!
//! ```json
//! {
//!   "Notepad": { "version": "1.2.0", "installed_on": "2025-03-01T14:22:10.512345" }
//! }
//! ```
//!
//! Timestamps are kept exactly as written. Entries stamped by other tools
//! (with a `Z` or `+02:00` offset, say) load and save unchanged.
//!
//! The file is a convenience cache, not an authority. A missing or unreadable
//! file loads as "nothing installed" rather than failing the command; writes
//! go through a temporary file that is renamed into place, so a crash mid-write
//! leaves the previous contents intact.

use crate::error::Result;
use anyhow::Context;
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// ISO-8601 formats written without an offset.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Installation time as stored in the record file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstalledOn(String);

impl InstalledOn {
    pub fn now() -> Self {
        Local::now().naive_local().into()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local wall-clock time, if the stored text is a recognisable
    /// ISO-8601 timestamp. Offset forms are converted to local time.
    pub fn to_local(&self) -> Option<NaiveDateTime> {
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&self.0, format).ok())
            .or_else(|| {
                DateTime::parse_from_rfc3339(&self.0)
                    .ok()
                    .map(|t| t.with_timezone(&Local).naive_local())
            })
    }
}

impl From<NaiveDateTime> for InstalledOn {
    fn from(time: NaiveDateTime) -> Self {
        Self(time.format(NAIVE_FORMATS[0]).to_string())
    }
}

impl fmt::Display for InstalledOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_local() {
            Some(time) => write!(f, "{}", time.format("%Y-%m-%d %H:%M")),
            None => f.write_str(&self.0),
        }
    }
}

/// One installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    pub version: String,
    pub installed_on: InstalledOn,
}

impl InstallRecord {
    pub fn new(version: impl Into<String>, installed_on: impl Into<InstalledOn>) -> Self {
        Self {
            version: version.into(),
            installed_on: installed_on.into(),
        }
    }

    /// Record stamped with the current local time.
    pub fn now(version: impl Into<String>) -> Self {
        Self::new(version, InstalledOn::now())
    }
}

/// Package name → record.
pub type Records = BTreeMap<String, InstallRecord>;

/// The installation record file.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all records. Absent or malformed files yield an empty mapping.
    pub fn load(&self) -> Records {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                }
                return Records::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(
                "Ignoring malformed record file {}: {}",
                self.path.display(),
                e
            );
            Records::new()
        })
    }

    pub fn get(&self, name: &str) -> Option<InstallRecord> {
        self.load().remove(name)
    }

    /// Replace the record file with `records`.
    pub fn save(&self, records: &Records) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;

        let json = serde_json::to_string_pretty(records)?;

        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(())
    }

    /// Insert or replace the record for `name`.
    pub fn upsert(
        &self,
        name: &str,
        version: &str,
        installed_on: impl Into<InstalledOn>,
    ) -> Result<()> {
        let mut records = self.load();
        records.insert(name.to_string(), InstallRecord::new(version, installed_on));
        self.save(&records)
    }

    /// Drop the record for `name`. Returns whether one existed; the file is
    /// only rewritten when something changed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut records = self.load();
        if records.remove(name).is_none() {
            return Ok(false);
        }
        self.save(&records)?;
        Ok(true)
    }
}
