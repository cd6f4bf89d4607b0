//! Package catalog: the document listing every installable package.
//!
//! The catalog is a JSON file cached locally and refreshed from a remote
//! source on demand:
//!
//! ```json
//! {
//!   "updateurl": "https://example.com/packages.json",
//!   "packages": [
//!     {
//!       "name": "Notepad",
//!       "version": "1.2.0",
//!       "description": "A simple text editor",
//!       "os": ["Windows", "Darwin"],
//!       "requirepath": false,
//!       "shortcut": true,
//!       "url": { "Windows": "https://example.com/notepad.exe" },
//!       "sha256": { "Windows": "9f86d0..." }
//!     }
//!   ]
//! }
//! ```
//!
//! [`CatalogStore`] owns the cached file. It never talks to the network on its
//! own; callers hand it a [`Fetcher`] for the operations that download.

use crate::download::Fetcher;
use crate::error::{Result, ToolboxError};
use crate::paths;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/ravendevteam/toolbox/main/packages.json";

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// The full catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updateurl: Option<String>,
    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,
}

/// One package's catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub os: Vec<String>,
    #[serde(default)]
    pub requirepath: bool,
    #[serde(default)]
    pub shortcut: bool,
    #[serde(default)]
    pub url: HashMap<String, String>,
    #[serde(default)]
    pub sha256: HashMap<String, String>,
}

/// Where to download a package from on one platform, and what it must hash to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadTarget<'a> {
    pub url: &'a str,
    pub sha256: &'a str,
}

impl PackageDescriptor {
    pub fn supports(&self, platform: &Platform) -> bool {
        platform.is_listed_in(&self.os)
    }

    /// URL and digest for `platform`, or `None` when either is missing.
    pub fn target(&self, platform: &Platform) -> Option<DownloadTarget<'_>> {
        let url = self.url.get(platform.as_str())?;
        let sha256 = self.sha256.get(platform.as_str())?;
        Some(DownloadTarget { url, sha256 })
    }

    pub fn summary(&self) -> PackageSummary<'_> {
        PackageSummary { descriptor: self }
    }
}

impl Catalog {
    /// Parse and validate a catalog document.
    pub fn from_json(json: &str) -> std::result::Result<Self, String> {
        let catalog: Catalog = serde_json::from_str(json).map_err(|e| e.to_string())?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Names must be usable as directory names and unique ignoring case.
    fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for package in &self.packages {
            paths::validate_package_name(&package.name)
                .map_err(|_| format!("invalid package name '{}'", package.name))?;
            if !seen.insert(package.name.to_lowercase()) {
                return Err(format!("duplicate package name '{}'", package.name));
            }
        }
        Ok(())
    }

    /// Case-insensitive lookup.
    pub fn find(&self, name: &str) -> Option<&PackageDescriptor> {
        self.packages
            .iter()
            .find(|p| paths::same_package_name(&p.name, name))
    }

    /// Closest catalog name to a misspelled query, if any is close enough.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        let query = name.to_lowercase();
        self.packages
            .iter()
            .map(|p| (p.name.as_str(), strsim::jaro_winkler(&query, &p.name.to_lowercase())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name)
    }

    /// Descriptors in catalog order.
    pub fn list_all(&self) -> &[PackageDescriptor] {
        &self.packages
    }

    /// Display summaries in catalog order. The iterator is `Clone`, so a
    /// caller can walk it more than once without reloading.
    pub fn summaries(&self) -> impl Iterator<Item = PackageSummary<'_>> + Clone {
        self.packages.iter().map(PackageDescriptor::summary)
    }
}

/// Human-readable view of a descriptor for `list`.
#[derive(Debug, Clone, Copy)]
pub struct PackageSummary<'a> {
    descriptor: &'a PackageDescriptor,
}

impl PackageSummary<'_> {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

impl fmt::Display for PackageSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
        let d = self.descriptor;
        writeln!(f, "Name: {}", d.name)?;
        writeln!(f, "Version: {}", d.version)?;
        writeln!(f, "Description: {}", d.description)?;
        writeln!(f, "Available for: {}", d.os.join(", "))?;
        writeln!(f, "Requires Path: {}", yes_no(d.requirepath))?;
        write!(f, "Creates Shortcut: {}", yes_no(d.shortcut))
    }
}

/// Where the refresh came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub source: String,
    /// Set when the cached catalog could not be read and the default source
    /// was used instead.
    pub fallback_reason: Option<String>,
}

/// The locally cached catalog file.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
    default_url: String,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>, default_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_url: default_url.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Download the catalog from the default source if no local copy exists.
    ///
    /// Returns `true` when a download happened.
    pub async fn ensure_available(&self, fetcher: &impl Fetcher) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }

        tracing::debug!("catalog missing at {}, downloading", self.path.display());
        self.download(fetcher, &self.default_url).await?;
        Ok(true)
    }

    /// Read and validate the cached catalog.
    pub fn load(&self) -> Result<Catalog> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolboxError::CatalogMissing(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        Catalog::from_json(&contents).map_err(|reason| ToolboxError::CatalogCorrupt {
            path: self.path.clone(),
            reason,
        })
    }

    /// Re-download the catalog from its advertised `updateurl`, falling back
    /// to the default source when the cached copy is missing or unreadable.
    pub async fn refresh(&self, fetcher: &impl Fetcher) -> Result<RefreshOutcome> {
        let (source, fallback_reason) = match self.load() {
            Ok(catalog) => (
                catalog
                    .updateurl
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| self.default_url.clone()),
                None,
            ),
            Err(e) => {
                tracing::warn!("using default catalog source: {}", e);
                (self.default_url.clone(), Some(e.to_string()))
            }
        };

        tracing::debug!("refreshing catalog from {}", source);
        self.download(fetcher, &source).await?;

        Ok(RefreshOutcome {
            source,
            fallback_reason,
        })
    }

    /// Fetch to a sibling file, then rename over the cached catalog so a
    /// failed download never clobbers the previous copy.
    async fn download(&self, fetcher: &impl Fetcher, url: &str) -> Result<()> {
        let unavailable = |reason: String| ToolboxError::CatalogUnavailable {
            url: url.to_string(),
            reason,
        };

        let parent = self
            .path
            .parent()
            .ok_or_else(|| unavailable(format!("invalid destination {}", self.path.display())))?;
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let partial = self.path.with_extension("json.part");
        if let Err(e) = fetcher.fetch(url, &partial, &mut |_: u64, _: Option<u64>| {}).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(unavailable(e.to_string()));
        }

        tokio::fs::rename(&partial, &self.path)
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "updateurl": "https://mirror.example.com/packages.json",
        "packages": [
            {
                "name": "Notepad",
                "version": "1.2.0",
                "description": "Text editor",
                "os": ["Windows", "Darwin"],
                "requirepath": false,
                "shortcut": true,
                "url": {"Windows": "https://example.com/notepad.exe", "Darwin": "https://example.com/notepad.zip"},
                "sha256": {"Windows": "aaa", "Darwin": "bbb"}
            },
            {
                "name": "Rebound",
                "version": "0.9",
                "description": "Backup tool",
                "os": ["Linux"],
                "requirepath": true,
                "shortcut": false,
                "url": {},
                "sha256": {}
            }
        ]
    }"#;

    #[test]
    fn test_parse_preserves_order() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let names: Vec<_> = catalog.list_all().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Notepad", "Rebound"]);
        assert_eq!(
            catalog.updateurl.as_deref(),
            Some("https://mirror.example.com/packages.json")
        );
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.find("notepad").unwrap().name, "Notepad");
        assert_eq!(catalog.find("REBOUND").unwrap().name, "Rebound");
        assert!(catalog.find("missing").is_none());
    }

    #[test]
    fn test_target_requires_url_and_digest() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let notepad = catalog.find("Notepad").unwrap();
        let target = notepad.target(&Platform::new("Windows")).unwrap();
        assert_eq!(target.url, "https://example.com/notepad.exe");
        assert_eq!(target.sha256, "aaa");

        let rebound = catalog.find("Rebound").unwrap();
        assert!(rebound.supports(&Platform::new("Linux")));
        assert!(rebound.target(&Platform::new("Linux")).is_none());
    }

    #[test]
    fn test_suggest_close_names() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.suggest("notpad"), Some("Notepad"));
        assert_eq!(catalog.suggest("zzzzzz"), None);
    }

    #[test]
    fn test_find_folds_non_ascii_case() {
        let json = r#"{"packages": [{"name": "Ärger", "version": "1"}]}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.find("ärger").unwrap().name, "Ärger");

        let duplicate = r#"{"packages": [
            {"name": "Ärger", "version": "1"},
            {"name": "ärger", "version": "2"}
        ]}"#;
        assert!(Catalog::from_json(duplicate).is_err());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let json = r#"{"packages": [
            {"name": "a", "version": "1"},
            {"name": "A", "version": "2"}
        ]}"#;
        assert!(Catalog::from_json(json).unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let json = r#"{"packages": [{"name": "../evil", "version": "1"}]}"#;
        assert!(Catalog::from_json(json).is_err());
    }

    #[test]
    fn test_minimal_document() {
        let catalog = Catalog::from_json("{}").unwrap();
        assert!(catalog.updateurl.is_none());
        assert!(catalog.list_all().is_empty());
    }

    #[test]
    fn test_summary_format() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let text = catalog.find("Notepad").unwrap().summary().to_string();
        assert_eq!(
            text,
            "Name: Notepad\nVersion: 1.2.0\nDescription: Text editor\n\
             Available for: Windows, Darwin\nRequires Path: No\nCreates Shortcut: Yes"
        );
    }

    #[test]
    fn test_summaries_are_restartable() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let summaries = catalog.summaries();
        assert_eq!(summaries.clone().count(), 2);
        let names: Vec<_> = summaries.map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["Notepad", "Rebound"]);
    }

    #[test]
    fn test_load_missing_and_corrupt() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("packages.json");
        let store = CatalogStore::new(&path, DEFAULT_CATALOG_URL);

        assert!(matches!(store.load(), Err(ToolboxError::CatalogMissing(_))));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            store.load(),
            Err(ToolboxError::CatalogCorrupt { .. })
        ));
    }
}
