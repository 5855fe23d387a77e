use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::types::{IssuePayload, PullRequestPayload, TargetType};
use crate::utils::parse_repository_url;

/// The pull request or issue a rule set is evaluated against.
#[derive(Debug, Clone)]
pub struct Target {
    pub author: String,
    pub body: String,
    pub number: u64,
    pub title: String,
    pub owner: String,
    pub repo_name: String,
    pub kind: TargetKind,
}

#[derive(Debug, Clone)]
pub enum TargetKind {
    PullRequest(Box<PullRequestPayload>),
    Issue(Box<IssuePayload>),
}

impl Target {
    pub fn from_pull_request(pr: PullRequestPayload) -> Result<Self> {
        let (owner, repo_name) = match pr.base.repo.as_ref() {
            Some(repo) => (repo.owner.login.clone(), repo.name.clone()),
            None => pr
                .url
                .as_deref()
                .and_then(parse_repository_url)
                .ok_or_else(|| {
                    anyhow::anyhow!("Pull request #{} has no base repository", pr.number)
                })?,
        };

        Ok(Target {
            author: pr.user.as_ref().map(|u| u.login.clone()).unwrap_or_default(),
            body: pr.body.clone().unwrap_or_default(),
            number: pr.number,
            title: pr.title.clone(),
            owner,
            repo_name,
            kind: TargetKind::PullRequest(Box::new(pr)),
        })
    }

    pub fn from_issue(issue: IssuePayload) -> Result<Self> {
        let (owner, repo_name) = match issue.repository.as_ref() {
            Some(repo) => (repo.owner.login.clone(), repo.name.clone()),
            None => issue
                .repository_url
                .as_deref()
                .and_then(parse_repository_url)
                .ok_or_else(|| anyhow::anyhow!("Issue #{} has no repository", issue.number))?,
        };

        Ok(Target {
            author: issue
                .user
                .as_ref()
                .map(|u| u.login.clone())
                .unwrap_or_default(),
            body: issue.body.clone().unwrap_or_default(),
            number: issue.number,
            title: issue.title.clone(),
            owner,
            repo_name,
            kind: TargetKind::Issue(Box::new(issue)),
        })
    }

    pub fn pull_request(&self) -> Option<&PullRequestPayload> {
        match &self.kind {
            TargetKind::PullRequest(pr) => Some(pr),
            TargetKind::Issue(_) => None,
        }
    }

    pub fn target_type(&self) -> TargetType {
        match self.kind {
            TargetKind::PullRequest(_) => TargetType::PullRequest,
            TargetKind::Issue(_) => TargetType::Issue,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match &self.kind {
            TargetKind::PullRequest(pr) => pr.created_at,
            TargetKind::Issue(issue) => issue.created_at,
        }
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        match &self.kind {
            TargetKind::PullRequest(pr) => pr.updated_at,
            TargetKind::Issue(issue) => issue.updated_at,
        }
    }

    pub fn key(&self) -> TargetKey {
        TargetKey {
            owner: self.owner.clone(),
            repo: self.repo_name.clone(),
            number: self.number,
        }
    }
}

/// Identity of a target within the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetKey {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl std::fmt::Display for TargetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Desired on/off state per label, built while evaluating one target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelUpdates {
    set: BTreeMap<String, bool>,
}

impl LabelUpdates {
    pub fn get(&self, label: &str) -> Option<bool> {
        self.set.get(label).copied()
    }

    pub fn set(&mut self, label: &str, desired: bool) {
        self.set.insert(label.to_string(), desired);
    }

    pub fn remove(&mut self, label: &str) {
        self.set.remove(label);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.set.iter().map(|(label, desired)| (label.as_str(), *desired))
    }
}

impl FromIterator<(String, bool)> for LabelUpdates {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        LabelUpdates {
            set: iter.into_iter().collect(),
        }
    }
}

/// Desired definition of a repository label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDefinition {
    pub name: String,
    pub color: String,
    pub description: String,
}
