//! Seams between the labeling engine and the hosting platform.
//!
//! `GitHubClient` implements every trait here; tests substitute in-memory
//! fakes.

use anyhow::Result;
use async_trait::async_trait;

use crate::config::LabelerConfig;
use crate::data::{IssuePayload, LabelDefinition, LabelPayload, PullRequestPayload, Target};

/// Supplies the rule set for the repository being processed.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn fetch_config(&self) -> Result<LabelerConfig>;
}

/// Reads and replaces the labels applied to a pull request or issue.
#[async_trait]
pub trait LabelStore: Send + Sync {
    async fn current_labels(&self, target: &Target) -> Result<Vec<String>>;

    /// Replace the full label set of `target` in one call.
    async fn replace_labels(&self, target: &Target, labels: &[String]) -> Result<()>;
}

/// Raw unified diff of a pull request.
#[async_trait]
pub trait DiffProvider: Send + Sync {
    async fn raw_diff(&self, owner: &str, repo: &str, number: u64) -> Result<String>;
}

#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn is_member(&self, org: &str, user: &str, team_slug: &str) -> Result<bool>;
}

/// Listing used by scheduled runs.
#[async_trait]
pub trait RepositoryLister: Send + Sync {
    async fn list_issues(&self, owner: &str, repo: &str) -> Result<Vec<IssuePayload>>;

    async fn list_pull_requests(&self, owner: &str, repo: &str)
        -> Result<Vec<PullRequestPayload>>;

    /// Full pull request detail; listings omit mergeability and line counts.
    async fn pull_request(&self, owner: &str, repo: &str, number: u64)
        -> Result<PullRequestPayload>;
}

/// Repository-level label definitions (name, color, description).
#[async_trait]
pub trait LabelCatalog: Send + Sync {
    async fn repo_labels(&self, owner: &str, repo: &str) -> Result<Vec<LabelPayload>>;

    async fn create_label(&self, owner: &str, repo: &str, label: &LabelDefinition) -> Result<()>;

    async fn update_label(&self, owner: &str, repo: &str, label: &LabelDefinition) -> Result<()>;
}

/// A rule set loaded once and handed out for every target.
#[derive(Debug, Clone)]
pub struct StaticConfig(pub LabelerConfig);

#[async_trait]
impl ConfigProvider for StaticConfig {
    async fn fetch_config(&self) -> Result<LabelerConfig> {
        Ok(self.0.clone())
    }
}
