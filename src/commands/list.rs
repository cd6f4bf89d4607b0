use crate::download::Fetcher;
use crate::error::Result;
use crate::package_manager::PackageManager;
use colored::Colorize;

pub async fn list<F: Fetcher>(pm: &PackageManager<F>) -> Result<()> {
    let catalog = pm.list_packages().await?;

    println!("{}\n", "Available Packages:".white());
    for summary in catalog.summaries() {
        let text = summary.to_string();
        let mut lines = text.lines();
        if let Some(first) = lines.next() {
            println!("{}", first.cyan());
        }
        for line in lines {
            println!("{}", line);
        }
        println!();
    }

    Ok(())
}

pub fn installed<F: Fetcher>(pm: &PackageManager<F>) -> Result<()> {
    let packages = pm.installed();

    if packages.is_empty() {
        println!("No packages installed");
        return Ok(());
    }

    println!(
        "{} installed package{}:\n",
        packages.len().to_string().bold(),
        if packages.len() == 1 { "" } else { "s" }
    );

    for pkg in &packages {
        let installed_on = &pkg.record.installed_on;
        if pkg.present {
            let size = calculate_dir_size(&pkg.path)
                .map(format_size)
                .unwrap_or_else(|_| "?".to_string());
            println!(
                "  {} {} {} {}",
                pkg.name.cyan(),
                pkg.record.version.dimmed(),
                format!("installed {}", installed_on).dimmed(),
                size.dimmed()
            );
        } else {
            println!(
                "  {} {} {} {}",
                pkg.name.cyan(),
                pkg.record.version.dimmed(),
                format!("installed {}", installed_on).dimmed(),
                "(directory missing)".yellow()
            );
        }
    }

    Ok(())
}

/// Total size of regular files under `path`; 0 if it doesn't exist.
fn calculate_dir_size(path: &std::path::Path) -> anyhow::Result<u64> {
    let mut total = 0u64;

    if !path.exists() {
        return Ok(0);
    }

    for entry in walkdir::WalkDir::new(path).follow_links(false).max_open(64) {
        let entry = entry.map_err(|e| anyhow::anyhow!("Failed to read directory: {}", e))?;
        if entry.file_type().is_file() {
            total += entry
                .metadata()
                .map_err(|e| anyhow::anyhow!("Failed to read metadata: {}", e))?
                .len();
        }
    }

    Ok(total)
}

/// Format byte size as human-readable string
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_dir_size_counts_nested_files() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a"), vec![0u8; 100]).unwrap();
        std::fs::write(dir.path().join("sub/b"), vec![0u8; 28]).unwrap();

        assert_eq!(calculate_dir_size(dir.path()).unwrap(), 128);
        assert_eq!(calculate_dir_size(&dir.path().join("missing")).unwrap(), 0);
    }
}
