//! Read-through resolution and build-config updates

mod common;

use common::{test_config, MockCache};
use serde_json::json;
use std::time::Duration;
use version_checker::resolver::{ProjectRef, RefSource, VersionResolver};

fn resolver_with(cache: &MockCache) -> VersionResolver<MockCache> {
    VersionResolver::from_config(cache.clone(), &test_config())
}

#[tokio::test]
async fn first_lookup_populates_cache_with_one_hour_ttl() {
    let cache = MockCache::new();
    let resolver = resolver_with(&cache);

    let result = resolver.get_project_ref("chrome").await;

    assert_eq!(
        result,
        ProjectRef::Found {
            version: "120.0.6099.71".to_string(),
            source: RefSource::Config,
        }
    );
    assert_eq!(
        cache.entry("chrome"),
        Some(("120.0.6099.71".to_string(), Duration::from_secs(3600)))
    );
    assert_eq!(cache.sets(), 1);
}

#[tokio::test]
async fn unknown_project_is_not_configured_and_never_cached() {
    let cache = MockCache::new();
    let resolver = resolver_with(&cache);

    assert_eq!(
        resolver.get_project_ref("firefox").await,
        ProjectRef::NotConfigured
    );
    assert_eq!(cache.sets(), 0);
    assert!(cache.entry("firefox").is_none());
}

#[tokio::test]
async fn cache_hit_masks_newer_config_value() {
    let cache = MockCache::new();
    cache.seed("chrome", "119.0.0");
    let resolver = resolver_with(&cache);

    let result = resolver.get_project_ref("chrome").await;

    assert_eq!(result.version(), Some("119.0.0"));
    assert_eq!(result.source(), Some(RefSource::Cache));
    assert_eq!(cache.sets(), 0);
}

#[tokio::test]
async fn warm_cache_is_idempotent() {
    let cache = MockCache::new();
    let resolver = resolver_with(&cache);

    let first = resolver.get_project_ref("brave-core").await;
    let second = resolver.get_project_ref("brave-core").await;

    assert_eq!(first.version(), second.version());
    assert_eq!(second.source(), Some(RefSource::Cache));
    assert_eq!(cache.sets(), 1);
}

#[tokio::test]
async fn cache_read_failure_degrades_to_build_config_without_write_back() {
    let cache = MockCache::new();
    cache.fail_gets(true);
    let resolver = resolver_with(&cache);

    let result = resolver.get_project_ref("chrome").await;

    assert_eq!(
        result,
        ProjectRef::Found {
            version: "120.0.6099.71".to_string(),
            source: RefSource::Degraded,
        }
    );
    assert_eq!(cache.sets(), 0);
}

#[tokio::test]
async fn cache_failure_for_unknown_project_is_unavailable() {
    let resolver = resolver_with(&MockCache::unreachable());
    assert_eq!(
        resolver.get_project_ref("firefox").await,
        ProjectRef::Unavailable
    );
}

#[tokio::test]
async fn write_back_failure_is_not_fatal() {
    let cache = MockCache::new();
    cache.fail_sets(true);
    let resolver = resolver_with(&cache);

    let result = resolver.get_project_ref("chrome").await;

    assert_eq!(result.version(), Some("120.0.6099.71"));
    assert_eq!(result.source(), Some(RefSource::Config));
    assert_eq!(cache.sets(), 1);
    assert!(cache.entry("chrome").is_none());
}

#[tokio::test]
async fn update_is_visible_on_next_cache_miss() {
    let cache = MockCache::new();
    let resolver = resolver_with(&cache);

    let outcome = resolver
        .update_build_config(&json!({"brave-core": "3.0.0"}))
        .await
        .unwrap();

    assert_eq!(outcome.updated, vec!["brave-core".to_string()]);
    assert_eq!(outcome.invalidated, 0);
    assert_eq!(
        resolver.get_project_ref("brave-core").await.version(),
        Some("3.0.0")
    );
    assert_eq!(
        resolver.build_config().get("chrome").as_deref(),
        Some("120.0.6099.71")
    );
}

#[tokio::test]
async fn update_leaves_cached_value_until_expiry_by_default() {
    let cache = MockCache::new();
    let resolver = resolver_with(&cache);
    resolver.get_project_ref("brave-core").await;

    resolver
        .update_build_config(&json!({"brave-core": "3.0.0"}))
        .await
        .unwrap();

    assert_eq!(cache.deletes(), 0);
    assert_eq!(
        resolver.get_project_ref("brave-core").await.version(),
        Some("1.61.100")
    );
}

#[tokio::test]
async fn invalidation_deletes_patched_keys_when_enabled() {
    let cache = MockCache::new();
    let mut config = test_config();
    config.cache.invalidate_on_update = true;
    let resolver = VersionResolver::from_config(cache.clone(), &config);
    resolver.get_project_ref("brave-core").await;
    resolver.get_project_ref("chrome").await;

    let outcome = resolver
        .update_build_config(&json!({"brave-core": "3.0.0"}))
        .await
        .unwrap();

    assert_eq!(outcome.invalidated, 1);
    assert!(cache.entry("brave-core").is_none());
    assert!(cache.entry("chrome").is_some());
    assert_eq!(
        resolver.get_project_ref("brave-core").await.version(),
        Some("3.0.0")
    );
}

#[tokio::test]
async fn failed_invalidation_still_applies_update() {
    let cache = MockCache::new();
    cache.fail_deletes(true);
    let mut config = test_config();
    config.cache.invalidate_on_update = true;
    let resolver = VersionResolver::from_config(cache.clone(), &config);

    let outcome = resolver
        .update_build_config(&json!({"chrome": "121.0"}))
        .await
        .unwrap();

    assert_eq!(outcome.invalidated, 0);
    assert_eq!(resolver.build_config().get("chrome").as_deref(), Some("121.0"));
}

#[tokio::test]
async fn invalid_patch_leaves_build_config_unchanged() {
    let cache = MockCache::new();
    let resolver = resolver_with(&cache);
    let before = resolver.build_config().snapshot();

    let err = resolver
        .update_build_config(&json!({"brave-core": "3.0.0", "firefox": "1.0"}))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(resolver.build_config().snapshot(), before);

    for bad in [json!(null), json!({}), json!({"chrome": 120}), json!({"chrome": "  "})] {
        assert!(resolver.update_build_config(&bad).await.is_err());
    }
    assert_eq!(resolver.build_config().snapshot(), before);
}

#[tokio::test]
async fn resolve_all_mixes_sources() {
    let cache = MockCache::new();
    cache.seed("chrome", "119.0.0");
    let resolver = resolver_with(&cache);

    let all = resolver.resolve_all().await;

    assert_eq!(all.len(), 2);
    assert_eq!(all[0].0, "brave-core");
    assert_eq!(all[0].1.source(), Some(RefSource::Config));
    assert_eq!(all[1].0, "chrome");
    assert_eq!(all[1].1.source(), Some(RefSource::Cache));
}
