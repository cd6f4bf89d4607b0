//! Desktop shortcuts for installed packages.
//!
//! On Windows a `.lnk` file is written through PowerShell's `WScript.Shell`
//! COM object. Everywhere else the shortcut is a symlink on the desktop.

use crate::error::{Result, ToolboxError};
use crate::platform::Platform;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Exposes an installed file as a user-visible launcher.
pub trait ShortcutRegistrar {
    /// Create (or replace) a launcher called `name` pointing at `target` and
    /// return where it was placed.
    fn register(&self, target: &Path, name: &str) -> Result<PathBuf>;
}

/// Writes a `.lnk` through `WScript.Shell`. Paths arrive as environment
/// variables, so nothing from the catalog is ever parsed as PowerShell.
const LNK_SCRIPT: &str = "\
$Shell = New-Object -ComObject WScript.Shell
$Shortcut = $Shell.CreateShortcut($env:TOOLBOX_LNK_PATH)
$Shortcut.TargetPath = $env:TOOLBOX_LNK_TARGET
$Shortcut.WorkingDirectory = $env:TOOLBOX_LNK_WORKDIR
$Shortcut.IconLocation = $env:TOOLBOX_LNK_TARGET + ',0'
$Shortcut.Save()";

fn lnk_command(shortcut_path: &Path, target: &Path) -> Command {
    let working_dir = target.parent().unwrap_or_else(|| Path::new("."));

    let mut command = Command::new("powershell");
    command
        .args(["-NoProfile", "-NonInteractive", "-Command", LNK_SCRIPT])
        .env("TOOLBOX_LNK_PATH", shortcut_path)
        .env("TOOLBOX_LNK_TARGET", target)
        .env("TOOLBOX_LNK_WORKDIR", working_dir);
    command
}

/// Shortcuts placed in the user's desktop directory.
#[derive(Debug, Clone)]
pub struct DesktopShortcut {
    desktop: PathBuf,
    platform: Platform,
}

impl DesktopShortcut {
    pub fn new(desktop: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            desktop: desktop.into(),
            platform,
        }
    }

    /// `~/Desktop` for the current user.
    pub fn detect(platform: Platform) -> Self {
        let home = std::env::var_os("USERPROFILE")
            .filter(|_| platform.is_windows())
            .or_else(|| std::env::var_os("HOME"))
            .unwrap_or_else(|| ".".into());
        Self::new(PathBuf::from(home).join("Desktop"), platform)
    }

    pub fn desktop(&self) -> &Path {
        &self.desktop
    }

    fn create_lnk(&self, target: &Path, name: &str) -> anyhow::Result<PathBuf> {
        let shortcut_path = self.desktop.join(format!("{}.lnk", name));
        let output = lnk_command(&shortcut_path, target).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("powershell failed: {}", stderr.trim());
        }

        Ok(shortcut_path)
    }

    #[cfg(unix)]
    fn create_symlink(&self, target: &Path, name: &str) -> anyhow::Result<PathBuf> {
        let shortcut_path = self.desktop.join(name);

        // Replace a stale link (or file) from a previous install
        if std::fs::symlink_metadata(&shortcut_path).is_ok() {
            std::fs::remove_file(&shortcut_path)?;
        }
        std::os::unix::fs::symlink(target, &shortcut_path)?;

        Ok(shortcut_path)
    }

    #[cfg(not(unix))]
    fn create_symlink(&self, _target: &Path, _name: &str) -> anyhow::Result<PathBuf> {
        anyhow::bail!("symlink shortcuts are not supported on this host")
    }
}

impl ShortcutRegistrar for DesktopShortcut {
    fn register(&self, target: &Path, name: &str) -> Result<PathBuf> {
        let result = std::fs::create_dir_all(&self.desktop)
            .map_err(anyhow::Error::from)
            .and_then(|_| {
                if self.platform.is_windows() {
                    self.create_lnk(target, name)
                } else {
                    self.create_symlink(target, name)
                }
            });

        result.map_err(|e| ToolboxError::ShortcutFailure {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}
