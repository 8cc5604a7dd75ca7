// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration records and state classification
//!
//! Remote platforms report migration state as an upper snake case string.
//! The classifiers here map those strings onto pending / succeeded / failed
//! so the poller never has to compare raw strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id prefix of repository migrations
pub const REPOSITORY_MIGRATION_ID_PREFIX: &str = "RM_";
/// Id prefix of organization migrations
pub const ORGANIZATION_MIGRATION_ID_PREFIX: &str = "OM_";

/// Which kind of remote migration an id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MigrationKind {
    Repository,
    Organization,
}

impl MigrationKind {
    /// Classify a platform-assigned migration id by its prefix
    pub fn from_id(id: &str) -> Option<Self> {
        if id.starts_with(REPOSITORY_MIGRATION_ID_PREFIX) {
            Some(MigrationKind::Repository)
        } else if id.starts_with(ORGANIZATION_MIGRATION_ID_PREFIX) {
            Some(MigrationKind::Organization)
        } else {
            None
        }
    }
}

impl fmt::Display for MigrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationKind::Repository => write!(f, "repository"),
            MigrationKind::Organization => write!(f, "organization"),
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

// =============================================================================
// Repository migrations
// =============================================================================

/// State of a repository migration as reported by the target platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RepositoryMigrationState {
    Queued,
    InProgress,
    PendingValidation,
    Succeeded,
    Failed,
    FailedValidation,
    /// A state string this client does not recognize; treated as failed
    Unknown(String),
}

impl RepositoryMigrationState {
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "QUEUED" => Self::Queued,
            "IN_PROGRESS" => Self::InProgress,
            "PENDING_VALIDATION" => Self::PendingValidation,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "FAILED_VALIDATION" => Self::FailedValidation,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "QUEUED",
            Self::InProgress => "IN_PROGRESS",
            Self::PendingValidation => "PENDING_VALIDATION",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::FailedValidation => "FAILED_VALIDATION",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::Queued | Self::InProgress | Self::PendingValidation
        )
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Anything that is neither pending nor succeeded is a failure terminal
    pub fn is_failed(&self) -> bool {
        !self.is_pending() && !self.is_succeeded()
    }
}

impl fmt::Display for RepositoryMigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RepositoryMigrationState {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for RepositoryMigrationState {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<RepositoryMigrationState> for String {
    fn from(state: RepositoryMigrationState) -> Self {
        state.as_str().to_string()
    }
}

/// Snapshot of one repository migration, as last fetched from the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMigration {
    pub id: String,
    pub state: RepositoryMigrationState,
    pub repository_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub warnings_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_log_url: Option<String>,
}

// =============================================================================
// Organization migrations
// =============================================================================

/// State of an organization migration as reported by the target platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrganizationMigrationState {
    Queued,
    InProgress,
    PreRepoMigration,
    RepoMigration,
    PostRepoMigration,
    Succeeded,
    Failed,
    FailedValidation,
    /// A state string this client does not recognize; treated as failed
    Unknown(String),
}

impl OrganizationMigrationState {
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "QUEUED" => Self::Queued,
            "IN_PROGRESS" => Self::InProgress,
            "PRE_REPO_MIGRATION" => Self::PreRepoMigration,
            "REPO_MIGRATION" => Self::RepoMigration,
            "POST_REPO_MIGRATION" => Self::PostRepoMigration,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "FAILED_VALIDATION" => Self::FailedValidation,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "QUEUED",
            Self::InProgress => "IN_PROGRESS",
            Self::PreRepoMigration => "PRE_REPO_MIGRATION",
            Self::RepoMigration => "REPO_MIGRATION",
            Self::PostRepoMigration => "POST_REPO_MIGRATION",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::FailedValidation => "FAILED_VALIDATION",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::Queued
                | Self::InProgress
                | Self::PreRepoMigration
                | Self::RepoMigration
                | Self::PostRepoMigration
        )
    }

    /// Whether the migration is in the phase that carries repository counts
    pub fn is_repo_migration(&self) -> bool {
        matches!(self, Self::RepoMigration)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn is_failed(&self) -> bool {
        !self.is_pending() && !self.is_succeeded()
    }
}

impl fmt::Display for OrganizationMigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OrganizationMigrationState {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for OrganizationMigrationState {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<OrganizationMigrationState> for String {
    fn from(state: OrganizationMigrationState) -> Self {
        state.as_str().to_string()
    }
}

/// Snapshot of one organization migration, as last fetched from the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMigration {
    pub id: String,
    pub state: OrganizationMigrationState,
    pub source_org_url: String,
    pub target_org_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_repositories_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_repositories_count: Option<u32>,
}

impl OrganizationMigration {
    /// Repositories migrated so far, as `(completed, total)`
    pub fn repository_progress(&self) -> (u32, u32) {
        let total = self.total_repositories_count.unwrap_or(0);
        let remaining = self.remaining_repositories_count.unwrap_or(0);
        (total.saturating_sub(remaining), total)
    }
}

// =============================================================================
// Records and requests
// =============================================================================

/// A migration in flight, of either kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MigrationRecord {
    Repository(RepositoryMigration),
    Organization(OrganizationMigration),
}

impl MigrationRecord {
    pub fn id(&self) -> &str {
        match self {
            MigrationRecord::Repository(m) => &m.id,
            MigrationRecord::Organization(m) => &m.id,
        }
    }

    pub fn kind(&self) -> MigrationKind {
        match self {
            MigrationRecord::Repository(_) => MigrationKind::Repository,
            MigrationRecord::Organization(_) => MigrationKind::Organization,
        }
    }

    /// Human-readable name of what is being migrated
    pub fn target_name(&self) -> &str {
        match self {
            MigrationRecord::Repository(m) => &m.repository_name,
            MigrationRecord::Organization(m) => &m.target_org_name,
        }
    }

    pub fn is_pending(&self) -> bool {
        match self {
            MigrationRecord::Repository(m) => m.state.is_pending(),
            MigrationRecord::Organization(m) => m.state.is_pending(),
        }
    }

    pub fn is_succeeded(&self) -> bool {
        match self {
            MigrationRecord::Repository(m) => m.state.is_succeeded(),
            MigrationRecord::Organization(m) => m.state.is_succeeded(),
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            MigrationRecord::Repository(m) => m.failure_reason.as_deref(),
            MigrationRecord::Organization(m) => m.failure_reason.as_deref(),
        }
    }
}

/// Parameters for starting a repository migration on the target platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMigrationRequest {
    pub migration_source_id: String,
    /// Node id of the target organization
    pub owner_id: String,
    pub source_repository_url: String,
    pub repository_name: String,
    pub target_repo_visibility: Option<String>,
    pub skip_releases: bool,
    pub lock_source: bool,
}

/// Parameters for starting an organization migration on the target platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationMigrationRequest {
    pub source_org_url: String,
    pub target_org_name: String,
    /// Slug of the enterprise that will own the target organization
    pub target_enterprise: String,
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
