//! High-level PackageManager API - the install/uninstall lifecycle.
//!
//! [`PackageManager`] ties the catalog, the record file, downloads, digest
//! verification, and shortcuts together. Each operation is ordered so that
//! the record file only ever says "installed" after everything else
//! succeeded:
//!
//! ```text
//! install:   catalog -> resolve -> platform check -> confirm -> download
//!            -> verify -> shortcut (advisory) -> record
//! uninstall: locate dir -> confirm -> remove dir -> drop record
//! ```
//!
//! A failure before the download touches nothing. A failed download or
//! digest check leaves the install directory (and whatever was fetched) in
//! place for inspection, but never writes a record.
//!
//! # Quick Start
//!
//! ```no_run
//! use toolbox::{HttpFetcher, InstallOutcome, PackageManager, Paths, Platform};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let platform = Platform::current();
//!     let pm = PackageManager::new(Paths::detect(&platform), platform, HttpFetcher::new()?);
//!
//!     for outcome in pm.install("Notepad", true).await? {
//!         if let InstallOutcome::Installed(result) = outcome {
//!             println!("Installed {} {}", result.name, result.version);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Injected collaborators
//!
//! The host platform, the confirmation prompt, the shortcut registrar, the
//! fetcher, and the progress [`Reporter`] are all supplied from outside, so
//! every path through install and uninstall can be driven in tests without
//! touching the network, the terminal, or the real desktop.

use crate::catalog::{Catalog, CatalogStore, DEFAULT_CATALOG_URL, PackageDescriptor, RefreshOutcome};
use crate::checksum;
use crate::confirm::{Confirm, StdinConfirm};
use crate::download::{self, Fetcher};
use crate::error::{Result, ToolboxError};
use crate::paths::{self, Paths};
use crate::platform::Platform;
use crate::record::{InstallRecord, RecordStore};
use crate::shortcut::{DesktopShortcut, ShortcutRegistrar};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Install request that selects every catalog package.
pub const WILDCARD: &str = "*";

/// Result of a completed install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    /// Catalog name of the package
    pub name: String,
    /// Installed version
    pub version: String,
    /// Installation directory
    pub path: PathBuf,
    /// Downloaded artifact inside `path`
    pub artifact: PathBuf,
    /// Desktop shortcut, when one was requested and created
    pub shortcut: Option<PathBuf>,
    /// Time taken (milliseconds)
    pub time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(InstallResult),
    /// The user declined the confirmation prompt; nothing was changed.
    Cancelled { name: String },
}

/// Result of a completed uninstall
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallResult {
    pub name: String,
    /// Removed directory
    pub path: PathBuf,
    /// Whether an installation record existed and was dropped
    pub record_removed: bool,
    /// Time taken (milliseconds)
    pub time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    Uninstalled(UninstallResult),
    Cancelled { name: String },
}

/// A recorded installation and whether its directory is still on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub record: InstallRecord,
    pub path: PathBuf,
    pub present: bool,
}

/// Receives progress notifications from long-running operations.
///
/// Every method has a no-op default, and `()` is the silent reporter.
pub trait Reporter {
    /// No local catalog yet; about to download one.
    fn catalog_downloading(&self, _path: &Path) {}

    fn catalog_downloaded(&self, _path: &Path) {}

    /// Confirmed and about to download.
    fn installing(&self, _package: &PackageDescriptor, _platform: &Platform) {}

    fn download_progress(&self, _downloaded: u64, _total: Option<u64>) {}

    fn downloaded(&self, _name: &str, _artifact: &Path) {}

    /// The download failed or its digest did not match.
    fn download_failed(&self, _name: &str) {}

    fn shortcut_created(&self, _shortcut: &Path) {}

    /// One package finished (installed or cancelled). Called before the next
    /// package of a wildcard run starts.
    fn install_finished(&self, _outcome: &InstallOutcome) {}

    /// Non-fatal problem worth telling the user about.
    fn advisory(&self, _error: &ToolboxError) {}
}

impl Reporter for () {}

/// Package lifecycle engine.
pub struct PackageManager<F> {
    paths: Paths,
    platform: Platform,
    catalog: CatalogStore,
    records: RecordStore,
    fetcher: F,
    shortcuts: Box<dyn ShortcutRegistrar>,
    confirm: Box<dyn Confirm>,
    reporter: Box<dyn Reporter>,
}

impl<F: Fetcher> PackageManager<F> {
    /// Engine for `platform` rooted at `paths`, prompting on stdin and
    /// placing shortcuts on the user's desktop.
    pub fn new(paths: Paths, platform: Platform, fetcher: F) -> Self {
        let catalog = CatalogStore::new(paths.catalog_file(), DEFAULT_CATALOG_URL);
        let records = RecordStore::new(paths.record_file());
        let shortcuts = DesktopShortcut::detect(platform.clone());

        Self {
            paths,
            platform,
            catalog,
            records,
            fetcher,
            shortcuts: Box::new(shortcuts),
            confirm: Box::new(StdinConfirm),
            reporter: Box::new(()),
        }
    }

    /// Default source used when the cached catalog has no `updateurl`.
    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog = CatalogStore::new(self.paths.catalog_file(), url);
        self
    }

    pub fn with_shortcuts(mut self, shortcuts: impl ShortcutRegistrar + 'static) -> Self {
        self.shortcuts = Box::new(shortcuts);
        self
    }

    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn catalog_store(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn record_store(&self) -> &RecordStore {
        &self.records
    }

    /// Load the catalog, downloading it first if there is no local copy.
    pub async fn catalog(&self) -> Result<Catalog> {
        if !self.catalog.exists() {
            self.reporter.catalog_downloading(self.catalog.path());
        }
        if self.catalog.ensure_available(&self.fetcher).await? {
            self.reporter.catalog_downloaded(self.catalog.path());
        }
        self.catalog.load()
    }

    /// Catalog for display. Summaries come from [`Catalog::summaries`].
    pub async fn list_packages(&self) -> Result<Catalog> {
        self.catalog().await
    }

    /// Re-download the catalog from its advertised source.
    pub async fn update(&self) -> Result<RefreshOutcome> {
        self.catalog.refresh(&self.fetcher).await
    }

    /// Install one package by name, or every package for [`WILDCARD`].
    ///
    /// Wildcard installs run in catalog order, one at a time, with the
    /// confirmation policy applied to each package. The first failure stops
    /// the run; packages before it stay installed.
    pub async fn install(&self, request: &str, skip_confirmation: bool) -> Result<Vec<InstallOutcome>> {
        let catalog = self.catalog().await?;

        if request == WILDCARD {
            let mut outcomes = Vec::with_capacity(catalog.packages.len());
            for package in catalog.list_all() {
                let outcome = self.install_descriptor(package, skip_confirmation).await?;
                self.reporter.install_finished(&outcome);
                outcomes.push(outcome);
            }
            return Ok(outcomes);
        }

        let package = catalog
            .find(request)
            .ok_or_else(|| ToolboxError::PackageNotFound {
                name: request.to_string(),
                suggestion: catalog.suggest(request).map(str::to_string),
            })?;

        let outcome = self.install_descriptor(package, skip_confirmation).await?;
        self.reporter.install_finished(&outcome);
        Ok(vec![outcome])
    }

    /// Install a single resolved catalog entry.
    pub async fn install_descriptor(
        &self,
        package: &PackageDescriptor,
        skip_confirmation: bool,
    ) -> Result<InstallOutcome> {
        let start = Instant::now();
        let name = package.name.as_str();

        // Step 1: Platform eligibility, before any prompt or network access
        if !package.supports(&self.platform) {
            return Err(ToolboxError::UnsupportedPlatform {
                name: name.to_string(),
                platform: self.platform.to_string(),
            });
        }

        // Step 2: Confirmation
        if !skip_confirmation
            && !self
                .confirm
                .confirm(&format!("Are you sure you want to install '{}'?", name))
        {
            return Ok(InstallOutcome::Cancelled {
                name: name.to_string(),
            });
        }

        // Step 3: Resolve download target and prepare the install directory
        let target = package
            .target(&self.platform)
            .ok_or_else(|| ToolboxError::CatalogCorrupt {
                path: self.catalog.path().to_path_buf(),
                reason: format!(
                    "'{}' lists {} but has no url or sha256 for it",
                    name, self.platform
                ),
            })?;
        let install_dir = self.paths.install_dir(name)?;

        self.reporter.installing(package, &self.platform);
        tokio::fs::create_dir_all(&install_dir).await?;

        // Step 4: Download into the install directory
        let artifact = install_dir.join(download::artifact_file_name(name, target.url));
        let reporter = &self.reporter;
        let fetched = self
            .fetcher
            .fetch(target.url, &artifact, &mut |downloaded: u64, total: Option<u64>| {
                reporter.download_progress(downloaded, total)
            })
            .await;
        if let Err(e) = fetched {
            self.reporter.download_failed(name);
            return Err(e);
        }
        self.reporter.downloaded(name, &artifact);

        // Step 5: Verify. On mismatch the artifact stays for inspection.
        let actual = checksum::file_sha256(&artifact).await?;
        if actual != target.sha256 {
            self.reporter.download_failed(name);
            tracing::warn!(
                "sha256 mismatch for {}: expected {}, got {}",
                artifact.display(),
                target.sha256,
                actual
            );
            return Err(ToolboxError::IntegrityFailure {
                name: name.to_string(),
                path: artifact,
                expected: target.sha256.to_string(),
                actual,
            });
        }

        // Step 6: Shortcut. Failures are advisories, never install failures.
        let shortcut = if package.shortcut {
            self.create_shortcut(&install_dir, name)
        } else {
            None
        };

        // Step 7: Record. Only now is the package "installed".
        let record = InstallRecord::now(&package.version);
        self.records
            .upsert(name, &record.version, record.installed_on)?;

        Ok(InstallOutcome::Installed(InstallResult {
            name: name.to_string(),
            version: package.version.clone(),
            path: install_dir,
            artifact,
            shortcut,
            time_ms: start.elapsed().as_millis() as u64,
        }))
    }

    fn create_shortcut(&self, install_dir: &Path, name: &str) -> Option<PathBuf> {
        let target = match first_entry(install_dir) {
            Ok(Some(target)) => target,
            Ok(None) => return None,
            Err(e) => {
                self.reporter.advisory(&ToolboxError::ShortcutFailure {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
                return None;
            }
        };

        match self.shortcuts.register(&target, name) {
            Ok(shortcut) => {
                self.reporter.shortcut_created(&shortcut);
                Some(shortcut)
            }
            Err(e) => {
                tracing::warn!("shortcut for {} failed: {}", name, e);
                self.reporter.advisory(&e);
                None
            }
        }
    }

    /// Remove a package's directory and its record.
    ///
    /// Needs no catalog. The directory decides whether the package is
    /// installed; a missing record is tolerated. `name` matches the
    /// directory ignoring case, so a package installed as `notepad` (stored
    /// under the catalog's `Notepad`) uninstalls under either spelling.
    pub async fn uninstall(&self, name: &str, skip_confirmation: bool) -> Result<UninstallOutcome> {
        let start = Instant::now();

        // Step 1: Locate
        let install_dir = self
            .paths
            .find_install_dir(name)?
            .ok_or_else(|| ToolboxError::NotInstalled(name.to_string()))?;
        let installed_name = install_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());

        // Step 2: Confirmation
        if !skip_confirmation
            && !self
                .confirm
                .confirm(&format!("Are you sure you want to uninstall '{}'?", name))
        {
            return Ok(UninstallOutcome::Cancelled {
                name: name.to_string(),
            });
        }

        // Step 3: Remove the directory; the record stays if this fails
        tokio::fs::remove_dir_all(&install_dir)
            .await
            .map_err(|source| ToolboxError::UninstallFailed {
                name: name.to_string(),
                source,
            })?;

        // Step 4: Drop the record, matching the name case-insensitively when
        // there is no exact entry
        let records = self.records.load();
        let key = records
            .keys()
            .find(|k| k.as_str() == installed_name)
            .or_else(|| {
                records
                    .keys()
                    .find(|k| paths::same_package_name(k, &installed_name))
            })
            .cloned();
        let record_removed = match key {
            Some(key) => self.records.remove(&key)?,
            None => false,
        };

        Ok(UninstallOutcome::Uninstalled(UninstallResult {
            name: installed_name,
            path: install_dir,
            record_removed,
            time_ms: start.elapsed().as_millis() as u64,
        }))
    }

    /// Every recorded installation, flagging records whose directory is gone.
    /// Records whose name is not a valid package name are skipped.
    pub fn installed(&self) -> Vec<InstalledPackage> {
        self.records
            .load()
            .into_iter()
            .filter_map(|(name, record)| {
                let path = match self.paths.install_dir(&name) {
                    Ok(path) => path,
                    Err(e) => {
                        tracing::warn!("skipping record: {}", e);
                        return None;
                    }
                };
                let present = path.is_dir();
                Some(InstalledPackage {
                    name,
                    record,
                    path,
                    present,
                })
            })
            .collect()
    }
}

/// First visible entry of a directory, by name.
fn first_entry(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    Ok(entries.into_iter().next())
}
