use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::str::FromStr;

// Webhook / REST payload types

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRef {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryRef {
    pub name: String,
    pub owner: UserRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    #[serde(default)]
    pub repo: Option<RepositoryRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub mergeable_state: Option<String>,
    #[serde(default)]
    pub author_association: Option<String>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub head: BranchRef,
    pub base: BranchRef,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuePayload {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub author_association: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub repository: Option<RepositoryRef>,
    /// Present when the issue listing returned a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl IssuePayload {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelPayload {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TeamMembershipPayload {
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentPayload {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Returns true when a listed item's state is "open" (any case).
/// A missing state counts as not open.
pub fn is_open(state: Option<&str>) -> bool {
    state.is_some_and(|s| s.eq_ignore_ascii_case("open"))
}

// Author association
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthorAssociation {
    Owner,
    Member,
    Collaborator,
    Contributor,
    FirstTimeContributor,
    FirstTimer,
    Mannequin,
    None,
}

impl AuthorAssociation {
    /// Members, owners and collaborators hold merge rights on the repository.
    pub fn can_merge(self) -> bool {
        matches!(
            self,
            AuthorAssociation::Owner | AuthorAssociation::Member | AuthorAssociation::Collaborator
        )
    }
}

impl FromStr for AuthorAssociation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "OWNER" => AuthorAssociation::Owner,
            "MEMBER" => AuthorAssociation::Member,
            "COLLABORATOR" => AuthorAssociation::Collaborator,
            "CONTRIBUTOR" => AuthorAssociation::Contributor,
            "FIRST_TIME_CONTRIBUTOR" => AuthorAssociation::FirstTimeContributor,
            "FIRST_TIMER" => AuthorAssociation::FirstTimer,
            "MANNEQUIN" => AuthorAssociation::Mannequin,
            _ => AuthorAssociation::None,
        })
    }
}

// Merge state as computed by GitHub
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergeState {
    Clean,
    Dirty,
    Blocked,
    Behind,
    Unstable,
    HasHooks,
    Draft,
    Unknown,
}

impl FromStr for MergeState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "clean" => MergeState::Clean,
            "dirty" => MergeState::Dirty,
            "blocked" => MergeState::Blocked,
            "behind" => MergeState::Behind,
            "unstable" => MergeState::Unstable,
            "has_hooks" => MergeState::HasHooks,
            "draft" => MergeState::Draft,
            _ => MergeState::Unknown,
        })
    }
}

/// Target type filter accepted by the `type` rule parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetType {
    PullRequest,
    Issue,
    All,
}

impl TargetType {
    pub fn to_str(self) -> &'static str {
        match self {
            TargetType::PullRequest => "pull_request",
            TargetType::Issue => "issue",
            TargetType::All => "all",
        }
    }
}

impl FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pull_request" => Ok(TargetType::PullRequest),
            "issue" => Ok(TargetType::Issue),
            "all" => Ok(TargetType::All),
            other => Err(format!(
                "type must be one of 'pull_request', 'issue' or 'all', got '{other}'"
            )),
        }
    }
}
