use crate::colors;
use crate::download::Fetcher;
use crate::error::Result;
use crate::package_manager::{InstallOutcome, PackageManager, UninstallOutcome, WILDCARD};
use colored::Colorize;

pub async fn install<F: Fetcher>(
    pm: &PackageManager<F>,
    request: &str,
    skip_confirmation: bool,
) -> Result<()> {
    // Per-package lines are printed by the reporter as each one finishes
    let outcomes = pm.install(request, skip_confirmation).await?;

    if request == WILDCARD {
        let installed = outcomes
            .iter()
            .filter(|o| matches!(o, InstallOutcome::Installed(_)))
            .count();
        println!(
            "{} Installed {} of {} package{}",
            "✓".green().bold(),
            installed.to_string().bold(),
            outcomes.len(),
            if outcomes.len() == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

pub async fn uninstall<F: Fetcher>(
    pm: &PackageManager<F>,
    name: &str,
    skip_confirmation: bool,
) -> Result<()> {
    match pm.uninstall(name, skip_confirmation).await? {
        UninstallOutcome::Uninstalled(result) => {
            colors::success(format!(
                "'{}' has been successfully uninstalled.",
                result.name
            ));
            if !result.record_removed {
                tracing::debug!("no installation record for {}", result.name);
            }
        }
        UninstallOutcome::Cancelled { name } => {
            colors::info(format!("Uninstallation of '{}' cancelled.", name));
        }
    }

    Ok(())
}
