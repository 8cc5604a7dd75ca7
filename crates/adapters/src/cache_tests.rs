// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mig_core::PipelineDefinition;

fn entry(id: &str, name: &str, is_disabled: bool) -> RepositoryEntry {
    RepositoryEntry {
        id: id.to_string(),
        name: name.to_string(),
        is_disabled,
    }
}

#[test]
fn empty_cache_misses() {
    let cache = InventoryCache::new();
    let scope = PipelineScope::new("contoso", "payments");
    assert!(cache.pipelines(&scope).is_none());
    assert!(cache.repositories(&scope).is_none());
    assert_eq!(cache.repository_id(&scope, "api"), None);
}

#[test]
fn scope_keys_ignore_case() {
    let cache = InventoryCache::new();
    cache.store_pipelines(
        &PipelineScope::new("Contoso", "Payments"),
        PipelineIndex::new(vec![PipelineDefinition {
            id: 5,
            name: "CI".into(),
            path: "\\".into(),
        }]),
    );
    let index = cache
        .pipelines(&PipelineScope::new("contoso", "PAYMENTS"))
        .unwrap();
    assert_eq!(index.resolve("CI"), Some(5));
}

#[test]
fn repository_id_lookup_is_case_insensitive() {
    let cache = InventoryCache::new();
    let scope = PipelineScope::new("contoso", "payments");
    cache.store_repositories(&scope, vec![entry("r1", "Api", false), entry("r2", "web", true)]);
    assert_eq!(cache.repository_id(&scope, "api"), Some("r1".to_string()));
    assert_eq!(cache.repository_id(&scope, "WEB"), Some("r2".to_string()));
    assert_eq!(cache.repository_id(&scope, "docs"), None);
}

#[test]
fn separate_caches_do_not_share_state() {
    let scope = PipelineScope::new("contoso", "payments");
    let first = InventoryCache::new();
    first.store_repositories(&scope, vec![entry("r1", "api", false)]);
    let second = InventoryCache::new();
    assert!(second.repositories(&scope).is_none());
}
