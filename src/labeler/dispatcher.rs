use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use super::context::EvaluationContext;
use super::matcher::find_matches;
use super::reconciler::reconcile;
use crate::config::LabelerConfig;
use crate::data::{is_open, Target, WebhookEvent};
use crate::services::{
    ConfigProvider, DiffProvider, GitHubClient, LabelStore, RepositoryLister, StaticConfig,
    TeamDirectory,
};

/// Event names that trigger a scan of every open item instead of a single
/// webhook payload.
pub fn is_bulk_event(event_name: &str) -> bool {
    matches!(event_name, "schedule" | "workflow_dispatch")
}

/// Outcome counts of a bulk run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BulkSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct Labeler {
    config: Arc<dyn ConfigProvider>,
    labels: Arc<dyn LabelStore>,
    diffs: Arc<dyn DiffProvider>,
    teams: Arc<dyn TeamDirectory>,
    repos: Arc<dyn RepositoryLister>,
}

impl Labeler {
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        labels: Arc<dyn LabelStore>,
        diffs: Arc<dyn DiffProvider>,
        teams: Arc<dyn TeamDirectory>,
        repos: Arc<dyn RepositoryLister>,
    ) -> Self {
        Labeler {
            config,
            labels,
            diffs,
            teams,
            repos,
        }
    }

    /// Labeler backed entirely by GitHub, with an already loaded rule set.
    pub fn for_github(client: GitHubClient, config: LabelerConfig) -> Self {
        let client = Arc::new(client);
        Labeler::new(
            Arc::new(StaticConfig(config)),
            client.clone(),
            client.clone(),
            client.clone(),
            client,
        )
    }

    /// Relabel the target carried by a webhook event.
    ///
    /// Returns the applied label set, or `None` for event types that carry
    /// no target.
    pub async fn handle_event(
        &self,
        event_name: &str,
        payload: &[u8],
    ) -> Result<Option<Vec<String>>> {
        let event = WebhookEvent::parse(event_name, payload)
            .with_context(|| format!("Unable to parse `{event_name}` event payload"))?;
        info!(event = event_name, action = ?event.action(), "Received event");

        let target = match event {
            WebhookEvent::PullRequest(e) | WebhookEvent::PullRequestTarget(e) => {
                Target::from_pull_request(e.pull_request)?
            }
            WebhookEvent::Issues(e) => Target::from_issue(e.issue)?,
            WebhookEvent::Unsupported(name) => {
                info!(
                    event = %name,
                    "Event type is not supported, please review your workflow config"
                );
                return Ok(None);
            }
        };

        self.execute_on(&target).await.map(Some)
    }

    /// Fetch the rule set and relabel one target.
    pub async fn execute_on(&self, target: &Target) -> Result<Vec<String>> {
        let config = self
            .config
            .fetch_config()
            .await
            .context("Unable to load labeler config")?;
        self.execute_with(target, &config).await
    }

    /// Evaluate `config` against `target` and replace its labels with the
    /// reconciled set.
    pub async fn execute_with(&self, target: &Target, config: &LabelerConfig) -> Result<Vec<String>> {
        info!(item = %target.key(), kind = target.target_type().to_str(), "Matching labels");

        let mut ctx = EvaluationContext::new(self.diffs.clone(), self.teams.clone());
        let updates = find_matches(target, &config.labels, &mut ctx).await?;

        let current = self.labels.current_labels(target).await?;
        let desired = reconcile(&current, &updates, config.append_only);
        info!(item = %target.key(), labels = ?desired, "Final set of labels");

        self.labels.replace_labels(target, &desired).await?;
        Ok(desired)
    }

    /// Relabel every open pull request, and every open issue when the rule
    /// set enables issues. A failing item is logged and the run continues.
    pub async fn process_repository(&self, owner: &str, repo: &str) -> Result<BulkSummary> {
        let config = self
            .config
            .fetch_config()
            .await
            .context("Unable to load labeler config")?;
        let mut summary = BulkSummary::default();

        self.process_pull_requests(owner, repo, &config, &mut summary)
            .await;

        if config.issues {
            self.process_issues(owner, repo, &config, &mut summary).await;
        } else {
            info!(
                "Issues must be explicitly enabled in order to be processed in scheduled mode"
            );
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Finished processing {owner}/{repo}"
        );
        Ok(summary)
    }

    async fn process_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        config: &LabelerConfig,
        summary: &mut BulkSummary,
    ) {
        let prs = match self.repos.list_pull_requests(owner, repo).await {
            Ok(prs) => prs,
            Err(e) => {
                error!("Unable to list pull requests in {owner}/{repo}: {e:#}");
                summary.failed += 1;
                return;
            }
        };

        for listed in prs {
            if !is_open(listed.state.as_deref()) {
                summary.skipped += 1;
                continue;
            }
            let number = listed.number;
            let result = async {
                let pr = self.repos.pull_request(owner, repo, number).await?;
                let target = Target::from_pull_request(pr)?;
                self.execute_with(&target, config).await
            }
            .await;
            record(summary, &format!("{owner}/{repo}#{number}"), result);
        }
    }

    async fn process_issues(
        &self,
        owner: &str,
        repo: &str,
        config: &LabelerConfig,
        summary: &mut BulkSummary,
    ) {
        let issues = match self.repos.list_issues(owner, repo).await {
            Ok(issues) => issues,
            Err(e) => {
                error!("Unable to list issues in {owner}/{repo}: {e:#}");
                summary.failed += 1;
                return;
            }
        };

        for issue in issues {
            // Covered by the pull request pass
            if issue.is_pull_request() || !is_open(issue.state.as_deref()) {
                summary.skipped += 1;
                continue;
            }
            let number = issue.number;
            let result = async {
                let target = Target::from_issue(issue)?;
                self.execute_with(&target, config).await
            }
            .await;
            record(summary, &format!("{owner}/{repo}#{number}"), result);
        }
    }
}

fn record(summary: &mut BulkSummary, item: &str, result: Result<Vec<String>>) {
    match result {
        Ok(_) => summary.processed += 1,
        Err(e) => {
            error!("Unable to execute action on {item}: {e:#}");
            summary.failed += 1;
        }
    }
}
