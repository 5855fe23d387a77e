use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use octocrab::Octocrab;
use serde::Serialize;
use std::process::Command;
use tracing::{debug, info};
use urlencoding::encode;

use super::providers::{DiffProvider, LabelCatalog, LabelStore, RepositoryLister, TeamDirectory};
use crate::data::{
    ContentPayload, IssuePayload, LabelDefinition, LabelPayload, PullRequestPayload, Target,
    TeamMembershipPayload,
};

const PER_PAGE: u8 = 100;

// Listings stop after this many pages.
const MAX_PAGES: u32 = 50;

/// Token from `GITHUB_TOKEN`, falling back to the `gh` CLI session.
pub fn get_github_token() -> Result<String> {
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        if !token.trim().is_empty() {
            return Ok(token.trim().to_string());
        }
    }

    let output = Command::new("gh").args(["auth", "token"]).output()?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token. Set GITHUB_TOKEN or run 'gh auth login' first.");
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[derive(Serialize)]
struct ListParams {
    state: &'static str,
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct RefParams<'a> {
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    git_ref: Option<&'a str>,
}

#[derive(Serialize)]
struct ReplaceLabelsBody<'a> {
    labels: &'a [String],
}

#[derive(Serialize)]
struct LabelBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    // GitHub rejects an empty color; leaving it out keeps or picks one
    #[serde(skip_serializing_if = "str::is_empty")]
    color: &'a str,
    description: &'a str,
}

/// GitHub REST API access for the labeler, backed by octocrab.
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { octocrab })
    }

    /// Client against a non-default API root (GitHub Enterprise, tests).
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .base_uri(base_uri)
            .context("Invalid GitHub API URL")?
            .personal_token(token.to_string())
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { octocrab })
    }

    /// Contents of a file in the repository at `git_ref` (default branch if `None`).
    pub async fn fetch_repo_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<String> {
        let route = format!(
            "/repos/{}/{}/contents/{}",
            encode(owner),
            encode(repo),
            path.trim_start_matches('/')
        );
        let content: ContentPayload = self
            .octocrab
            .get(route, Some(&RefParams { git_ref }))
            .await
            .with_context(|| {
                format!(
                    "Unable to load {owner}/{repo}/{path}@{}",
                    git_ref.unwrap_or("HEAD")
                )
            })?;

        decode_content(&content)
            .with_context(|| format!("Unable to decode {owner}/{repo}/{path}"))
    }

    async fn paginate<T>(&self, route: &str, state: Option<&'static str>) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let batch: Vec<T> = match state {
                Some(state) => {
                    let params = ListParams {
                        state,
                        per_page: PER_PAGE,
                        page,
                    };
                    self.octocrab.get(route, Some(&params)).await?
                }
                None => {
                    let params = PageParams {
                        per_page: PER_PAGE,
                        page,
                    };
                    self.octocrab.get(route, Some(&params)).await?
                }
            };

            let done = batch.len() < PER_PAGE as usize;
            items.extend(batch);
            if done {
                break;
            }
        }

        Ok(items)
    }
}

fn decode_content(content: &ContentPayload) -> Result<String> {
    let raw = content.content.as_deref().unwrap_or_default();
    match content.encoding.as_deref() {
        Some("base64") => {
            let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
            Ok(String::from_utf8(bytes)?)
        }
        _ => Ok(raw.to_string()),
    }
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

fn normalize_color(color: &str) -> &str {
    color.trim_start_matches('#')
}

#[async_trait]
impl LabelStore for GitHubClient {
    async fn current_labels(&self, target: &Target) -> Result<Vec<String>> {
        let route = format!(
            "/repos/{}/{}/issues/{}/labels",
            encode(&target.owner),
            encode(&target.repo_name),
            target.number
        );
        let labels: Vec<LabelPayload> = self
            .paginate(&route, None)
            .await
            .with_context(|| format!("Unable to list labels of {}", target.key()))?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn replace_labels(&self, target: &Target, labels: &[String]) -> Result<()> {
        info!(item = %target.key(), labels = ?labels, "Setting labels");
        let route = format!(
            "/repos/{}/{}/issues/{}/labels",
            encode(&target.owner),
            encode(&target.repo_name),
            target.number
        );
        let _applied: Vec<LabelPayload> = self
            .octocrab
            .put(route, Some(&ReplaceLabelsBody { labels }))
            .await
            .with_context(|| format!("Unable to replace labels of {}", target.key()))?;
        Ok(())
    }
}

#[async_trait]
impl DiffProvider for GitHubClient {
    async fn raw_diff(&self, owner: &str, repo: &str, number: u64) -> Result<String> {
        debug!(owner = %owner, repo = %repo, number, "Fetching pull request diff");
        self.octocrab
            .pulls(owner, repo)
            .get_diff(number)
            .await
            .with_context(|| format!("Unable to fetch diff of {owner}/{repo}#{number}"))
    }
}

#[async_trait]
impl TeamDirectory for GitHubClient {
    async fn is_member(&self, org: &str, user: &str, team_slug: &str) -> Result<bool> {
        let route = format!(
            "/orgs/{}/teams/{}/memberships/{}",
            encode(org),
            encode(team_slug),
            encode(user)
        );
        match self
            .octocrab
            .get::<TeamMembershipPayload, _, _>(route, None::<&()>)
            .await
        {
            Ok(membership) => Ok(membership.state == "active"),
            Err(err) if is_not_found(&err) => Err(anyhow::anyhow!(
                "Team `{org}/{team_slug}` was not found while checking `{user}`. \
                 The token needs read access to organization teams (the `read:org` scope); \
                 the default GITHUB_TOKEN of a workflow does not have it."
            )),
            Err(err) => Err(err).with_context(|| {
                format!("Unable to check membership of {user} in {org}/{team_slug}")
            }),
        }
    }
}

#[async_trait]
impl RepositoryLister for GitHubClient {
    async fn list_issues(&self, owner: &str, repo: &str) -> Result<Vec<IssuePayload>> {
        let route = format!("/repos/{}/{}/issues", encode(owner), encode(repo));
        self.paginate(&route, Some("open"))
            .await
            .with_context(|| format!("Unable to list issues in {owner}/{repo}"))
    }

    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequestPayload>> {
        let route = format!("/repos/{}/{}/pulls", encode(owner), encode(repo));
        self.paginate(&route, Some("open"))
            .await
            .with_context(|| format!("Unable to list pull requests in {owner}/{repo}"))
    }

    async fn pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestPayload> {
        let route = format!("/repos/{}/{}/pulls/{number}", encode(owner), encode(repo));
        self.octocrab
            .get(route, None::<&()>)
            .await
            .with_context(|| format!("Unable to fetch {owner}/{repo}#{number}"))
    }
}

#[async_trait]
impl LabelCatalog for GitHubClient {
    async fn repo_labels(&self, owner: &str, repo: &str) -> Result<Vec<LabelPayload>> {
        let route = format!("/repos/{}/{}/labels", encode(owner), encode(repo));
        self.paginate(&route, None)
            .await
            .with_context(|| format!("Unable to list labels in {owner}/{repo}"))
    }

    async fn create_label(&self, owner: &str, repo: &str, label: &LabelDefinition) -> Result<()> {
        let route = format!("/repos/{}/{}/labels", encode(owner), encode(repo));
        let body = LabelBody {
            name: Some(&label.name),
            color: normalize_color(&label.color),
            description: &label.description,
        };
        let _created: LabelPayload = self
            .octocrab
            .post(route, Some(&body))
            .await
            .with_context(|| format!("Unable to create label `{}`", label.name))?;
        Ok(())
    }

    async fn update_label(&self, owner: &str, repo: &str, label: &LabelDefinition) -> Result<()> {
        let route = format!(
            "/repos/{}/{}/labels/{}",
            encode(owner),
            encode(repo),
            encode(&label.name)
        );
        let body = LabelBody {
            name: None,
            color: normalize_color(&label.color),
            description: &label.description,
        };
        let _updated: LabelPayload = self
            .octocrab
            .patch(route, Some(&body))
            .await
            .with_context(|| format!("Unable to update label `{}`", label.name))?;
        Ok(())
    }
}
