// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake migration API for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{MigrationApi, MigrationApiError};
use async_trait::async_trait;
use mig_core::{
    OrganizationMigration, OrganizationMigrationRequest, RepositoryMigration,
    RepositoryMigrationRequest,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Recorded migration API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationCall {
    GetRepositoryMigration { id: String },
    GetOrganizationMigration { id: String },
    StartRepositoryMigration { repository_name: String },
    StartOrganizationMigration { target_org_name: String },
    GetMigrationLogUrl { org: String, repo: String },
    DownloadLog { url: String },
}

#[derive(Default)]
struct FakeState {
    repository: HashMap<String, VecDeque<RepositoryMigration>>,
    organization: HashMap<String, VecDeque<OrganizationMigration>>,
    log_urls: VecDeque<Option<String>>,
    logs: HashMap<String, String>,
    error: Option<MigrationApiError>,
    next_id: u64,
    calls: Vec<MigrationCall>,
}

/// Pops the next scripted snapshot, repeating the last one forever
fn next_scripted<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

/// Fake migration API with scripted state sequences
#[derive(Clone, Default)]
pub struct FakeMigrationApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeMigrationApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<MigrationCall> {
        self.lock().calls.clone()
    }

    /// Script the snapshots returned by successive fetches of a repository migration
    pub fn script_repository_migration(&self, snapshots: Vec<RepositoryMigration>) {
        if let Some(first) = snapshots.first() {
            let id = first.id.clone();
            self.lock().repository.insert(id, snapshots.into());
        }
    }

    /// Script the snapshots returned by successive fetches of an organization migration
    pub fn script_organization_migration(&self, snapshots: Vec<OrganizationMigration>) {
        if let Some(first) = snapshots.first() {
            let id = first.id.clone();
            self.lock().organization.insert(id, snapshots.into());
        }
    }

    /// Script successive log URL lookups; `None` means no migration exists
    pub fn script_log_urls(&self, urls: Vec<Option<String>>) {
        self.lock().log_urls = urls.into();
    }

    pub fn set_log(&self, url: &str, content: &str) {
        self.lock().logs.insert(url.to_string(), content.to_string());
    }

    /// Make every subsequent call fail with `error`
    pub fn fail_with(&self, error: MigrationApiError) {
        self.lock().error = Some(error);
    }

    fn record(&self, call: MigrationCall) -> Result<(), MigrationApiError> {
        let mut state = self.lock();
        state.calls.push(call);
        match &state.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn allocate_id(&self, prefix: &str) -> String {
        let mut state = self.lock();
        state.next_id += 1;
        format!("{}{}", prefix, state.next_id)
    }
}

#[async_trait]
impl MigrationApi for FakeMigrationApi {
    async fn get_repository_migration(
        &self,
        id: &str,
    ) -> Result<RepositoryMigration, MigrationApiError> {
        self.record(MigrationCall::GetRepositoryMigration { id: id.to_string() })?;
        let mut state = self.lock();
        state
            .repository
            .get_mut(id)
            .and_then(next_scripted)
            .ok_or_else(|| MigrationApiError::NotFound(id.to_string()))
    }

    async fn get_organization_migration(
        &self,
        id: &str,
    ) -> Result<OrganizationMigration, MigrationApiError> {
        self.record(MigrationCall::GetOrganizationMigration { id: id.to_string() })?;
        let mut state = self.lock();
        state
            .organization
            .get_mut(id)
            .and_then(next_scripted)
            .ok_or_else(|| MigrationApiError::NotFound(id.to_string()))
    }

    async fn start_repository_migration(
        &self,
        request: &RepositoryMigrationRequest,
    ) -> Result<String, MigrationApiError> {
        self.record(MigrationCall::StartRepositoryMigration {
            repository_name: request.repository_name.clone(),
        })?;
        Ok(self.allocate_id(mig_core::migration::REPOSITORY_MIGRATION_ID_PREFIX))
    }

    async fn start_organization_migration(
        &self,
        request: &OrganizationMigrationRequest,
    ) -> Result<String, MigrationApiError> {
        self.record(MigrationCall::StartOrganizationMigration {
            target_org_name: request.target_org_name.clone(),
        })?;
        Ok(self.allocate_id(mig_core::migration::ORGANIZATION_MIGRATION_ID_PREFIX))
    }

    async fn get_migration_log_url(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<Option<String>, MigrationApiError> {
        self.record(MigrationCall::GetMigrationLogUrl {
            org: org.to_string(),
            repo: repo.to_string(),
        })?;
        Ok(next_scripted(&mut self.lock().log_urls).flatten())
    }

    async fn download_log(&self, url: &str) -> Result<String, MigrationApiError> {
        self.record(MigrationCall::DownloadLog {
            url: url.to_string(),
        })?;
        self.lock()
            .logs
            .get(url)
            .cloned()
            .ok_or_else(|| MigrationApiError::NotFound(url.to_string()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
