// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation memo of remote inventories
//!
//! Listing every pipeline or repository in a team project is slow, and a
//! batch run resolves many names against the same project. The cache is
//! created by the command that needs it and shared by handle; nothing here
//! outlives one invocation.

use mig_core::{PipelineIndex, PipelineScope, SourceRepository};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type ScopeKey = (String, String);

fn key(scope: &PipelineScope) -> ScopeKey {
    (scope.org.to_uppercase(), scope.project.to_uppercase())
}

/// A repository as listed by the source platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryEntry {
    pub id: String,
    pub name: String,
    pub is_disabled: bool,
}

impl RepositoryEntry {
    pub fn to_source_repository(&self) -> SourceRepository {
        SourceRepository {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct InventoryCache {
    pipelines: Mutex<HashMap<ScopeKey, Arc<PipelineIndex>>>,
    repositories: Mutex<HashMap<ScopeKey, Arc<Vec<RepositoryEntry>>>>,
}

impl InventoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pipelines(&self, scope: &PipelineScope) -> Option<Arc<PipelineIndex>> {
        self.pipelines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key(scope))
            .cloned()
    }

    pub fn store_pipelines(&self, scope: &PipelineScope, index: PipelineIndex) -> Arc<PipelineIndex> {
        let index = Arc::new(index);
        self.pipelines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key(scope), Arc::clone(&index));
        index
    }

    pub fn repositories(&self, scope: &PipelineScope) -> Option<Arc<Vec<RepositoryEntry>>> {
        self.repositories
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key(scope))
            .cloned()
    }

    pub fn store_repositories(
        &self,
        scope: &PipelineScope,
        repositories: Vec<RepositoryEntry>,
    ) -> Arc<Vec<RepositoryEntry>> {
        let repositories = Arc::new(repositories);
        self.repositories
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key(scope), Arc::clone(&repositories));
        repositories
    }

    /// Id of a cached repository, matched by name case-insensitively
    pub fn repository_id(&self, scope: &PipelineScope, name: &str) -> Option<String> {
        let repositories = self.repositories(scope)?;
        repositories
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .map(|r| r.id.clone())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
