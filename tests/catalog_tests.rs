// Catalog bootstrap, listing and refresh.


use serde_json::json;
use test_helpers::*;
use toolbox::ToolboxError;

fn catalog_bytes(value: &serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

#[tokio::test]
async fn test_missing_catalog_is_downloaded_from_default_source() {
    let env = TestEnvironment::new();
    let remote = catalog(vec![
        package("alpha", "1", &["Linux"], "https://dl.test/a", b"a"),
        package("beta", "2", &["Linux"], "https://dl.test/b", b"b"),
    ]);
    let fetcher = FakeFetcher::new().serve(CATALOG_URL, catalog_bytes(&remote));
    let pm = env.manager("Linux", fetcher.clone());

    let listed = pm.list_packages().await.unwrap();

    let names: Vec<_> = listed.summaries().map(|s| s.name().to_string()).collect();
    assert_eq!(names, ["alpha", "beta"]);
    assert_eq!(fetcher.requests(), vec![CATALOG_URL.to_string()]);
    assert!(env.paths.catalog_file().exists());

    // Cached from now on
    pm.list_packages().await.unwrap();
    assert_eq!(fetcher.requests().len(), 1);
}

#[tokio::test]
async fn test_unreachable_catalog_leaves_no_file() {
    let env = TestEnvironment::new();
    let pm = env.manager("Linux", FakeFetcher::new());

    let err = pm.list_packages().await.unwrap_err();

    assert!(matches!(
        err,
        ToolboxError::CatalogUnavailable { ref url, .. } if url == CATALOG_URL
    ));
    assert!(!env.paths.catalog_file().exists());
    assert!(!env.paths.catalog_file().with_extension("json.part").exists());
}

#[tokio::test]
async fn test_corrupt_catalog_is_reported_not_replaced() {
    let env = TestEnvironment::new();
    let path = env.paths.catalog_file();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();
    let fetcher = FakeFetcher::new();
    let pm = env.manager("Linux", fetcher.clone());

    assert!(matches!(
        pm.install("anything", true).await,
        Err(ToolboxError::CatalogCorrupt { .. })
    ));
    assert!(fetcher.requests().is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[tokio::test]
async fn test_empty_catalog_lists_nothing() {
    let env = TestEnvironment::new();
    env.write_catalog(&catalog(vec![]));
    let pm = env.manager("Linux", FakeFetcher::new());

    assert_eq!(pm.list_packages().await.unwrap().summaries().count(), 0);
}

#[tokio::test]
async fn test_update_follows_updateurl() {
    let env = TestEnvironment::new();
    let mirror = "https://mirror.test/packages.json";
    env.write_catalog(&json!({ "updateurl": mirror, "packages": [] }));
    let fresh = catalog(vec![package("gamma", "3", &["Linux"], "https://dl.test/g", b"g")]);
    let fetcher = FakeFetcher::new().serve(mirror, catalog_bytes(&fresh));
    let pm = env.manager("Linux", fetcher.clone());

    let outcome = pm.update().await.unwrap();

    assert_eq!(outcome.source, mirror);
    assert_eq!(outcome.fallback_reason, None);
    assert_eq!(fetcher.requests(), vec![mirror.to_string()]);
    let catalog = pm.list_packages().await.unwrap();
    assert!(catalog.find("gamma").is_some());
}

#[tokio::test]
async fn test_update_without_updateurl_uses_default() {
    let env = TestEnvironment::new();
    env.write_catalog(&json!({ "updateurl": "", "packages": [] }));
    let fetcher = FakeFetcher::new().serve(CATALOG_URL, catalog_bytes(&catalog(vec![])));
    let pm = env.manager("Linux", fetcher.clone());

    let outcome = pm.update().await.unwrap();

    assert_eq!(outcome.source, CATALOG_URL);
    assert_eq!(outcome.fallback_reason, None);
}

#[tokio::test]
async fn test_update_recovers_corrupt_catalog_from_default() {
    let env = TestEnvironment::new();
    let path = env.paths.catalog_file();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[]garbage").unwrap();
    let fresh = catalog(vec![package("delta", "4", &["Linux"], "https://dl.test/d", b"d")]);
    let fetcher = FakeFetcher::new().serve(CATALOG_URL, catalog_bytes(&fresh));
    let pm = env.manager("Linux", fetcher);

    let outcome = pm.update().await.unwrap();

    assert_eq!(outcome.source, CATALOG_URL);
    assert!(outcome.fallback_reason.is_some());
    assert!(pm.list_packages().await.unwrap().find("delta").is_some());
}

#[tokio::test]
async fn test_failed_update_keeps_previous_catalog() {
    let env = TestEnvironment::new();
    let existing = json!({
        "updateurl": "https://gone.test/packages.json",
        "packages": [package("keep", "1", &["Linux"], "https://dl.test/k", b"k")]
    });
    env.write_catalog(&existing);
    let before = std::fs::read_to_string(env.paths.catalog_file()).unwrap();
    let pm = env.manager("Linux", FakeFetcher::new());

    assert!(matches!(
        pm.update().await,
        Err(ToolboxError::CatalogUnavailable { .. })
    ));
    assert_eq!(std::fs::read_to_string(env.paths.catalog_file()).unwrap(), before);
}
