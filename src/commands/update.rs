use crate::colors;
use crate::download::Fetcher;
use crate::error::Result;
use crate::package_manager::PackageManager;

pub async fn update<F: Fetcher>(pm: &PackageManager<F>) -> Result<()> {
    let outcome = pm.update().await?;

    if outcome.fallback_reason.is_some() {
        colors::warning(format!(
            "Package list is missing or invalid. Used default update URL: {}",
            outcome.source
        ));
    }
    colors::info(format!("Updated package list from: {}", outcome.source));
    colors::success("Package list updated successfully!");

    Ok(())
}
