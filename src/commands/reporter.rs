//! Console rendering of engine progress notifications.

use crate::catalog::PackageDescriptor;
use crate::colors;
use crate::error::ToolboxError;
use crate::package_manager::{InstallOutcome, Reporter};
use crate::platform::Platform;
use crate::progress::DownloadProgress;
use colored::Colorize;
use std::cell::RefCell;
use std::path::Path;

/// Prints status lines and drives the download bar.
#[derive(Default)]
pub struct ConsoleReporter {
    download: RefCell<Option<DownloadProgress>>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for ConsoleReporter {
    fn catalog_downloading(&self, path: &Path) {
        println!(
            "{}",
            format!("Package list not found at {}. Downloading...", path.display()).yellow()
        );
    }

    fn catalog_downloaded(&self, path: &Path) {
        colors::success(format!(
            "Package list downloaded successfully to {}.",
            path.display()
        ));
    }

    fn installing(&self, package: &PackageDescriptor, platform: &Platform) {
        colors::info(format!(
            "Installing {} (v{}) for {}...",
            package.name, package.version, platform
        ));
        // Replacing a bar left over from a failed download abandons it
        *self.download.borrow_mut() = Some(DownloadProgress::new(&package.name));
    }

    fn download_progress(&self, downloaded: u64, total: Option<u64>) {
        if let Some(progress) = self.download.borrow().as_ref() {
            progress.update(downloaded, total);
        }
    }

    fn downloaded(&self, name: &str, artifact: &Path) {
        if let Some(progress) = self.download.borrow_mut().take() {
            progress.finish(format!("✓ {}", name));
        }
        colors::info(format!("Downloaded {} to {}", name, artifact.display()));
    }

    fn download_failed(&self, _name: &str) {
        if let Some(progress) = self.download.borrow_mut().take() {
            progress.fail();
        }
    }

    fn shortcut_created(&self, shortcut: &Path) {
        colors::success(format!("Shortcut created at {}", shortcut.display()));
    }

    fn install_finished(&self, outcome: &InstallOutcome) {
        match outcome {
            InstallOutcome::Installed(result) => {
                println!(
                    "{} {} {}",
                    "✓".green(),
                    format!("{} installed successfully!", result.name).green(),
                    format!("({}ms)", result.time_ms).dimmed()
                );
            }
            InstallOutcome::Cancelled { name } => {
                colors::info(format!("Installation of '{}' cancelled.", name));
            }
        }
    }

    fn advisory(&self, error: &ToolboxError) {
        colors::warning(error);
    }
}
