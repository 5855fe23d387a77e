#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use prlabeler::data::{IssuePayload, PullRequestPayload, Target};
use prlabeler::services::{
    DiffProvider, LabelStore, RepositoryLister, StaticConfig, TeamDirectory,
};
use prlabeler::{parse_config, Labeler};

/// In-memory stand-in for the GitHub API.
#[derive(Default)]
pub struct FakeGitHub {
    pub labels: Mutex<HashMap<u64, Vec<String>>>,
    pub replaced: Mutex<Vec<(u64, Vec<String>)>>,
    pub diff: String,
    pub pull_requests: Vec<PullRequestPayload>,
    pub issues: Vec<IssuePayload>,
    pub fail_replace_for: HashSet<u64>,
}

impl FakeGitHub {
    pub fn with_labels(self, number: u64, labels: &[&str]) -> Self {
        self.labels
            .lock()
            .unwrap()
            .insert(number, labels.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn replaced_numbers(&self) -> Vec<u64> {
        self.replaced.lock().unwrap().iter().map(|(n, _)| *n).collect()
    }
}

#[async_trait]
impl LabelStore for FakeGitHub {
    async fn current_labels(&self, target: &Target) -> Result<Vec<String>> {
        Ok(self
            .labels
            .lock()
            .unwrap()
            .get(&target.number)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_labels(&self, target: &Target, labels: &[String]) -> Result<()> {
        if self.fail_replace_for.contains(&target.number) {
            anyhow::bail!("Validation Failed");
        }
        self.labels
            .lock()
            .unwrap()
            .insert(target.number, labels.to_vec());
        self.replaced
            .lock()
            .unwrap()
            .push((target.number, labels.to_vec()));
        Ok(())
    }
}

#[async_trait]
impl DiffProvider for FakeGitHub {
    async fn raw_diff(&self, _owner: &str, _repo: &str, _number: u64) -> Result<String> {
        Ok(self.diff.clone())
    }
}

#[async_trait]
impl TeamDirectory for FakeGitHub {
    async fn is_member(&self, _org: &str, user: &str, team_slug: &str) -> Result<bool> {
        Ok(team_slug == "core" && user == "octo")
    }
}

#[async_trait]
impl RepositoryLister for FakeGitHub {
    async fn list_issues(&self, _owner: &str, _repo: &str) -> Result<Vec<IssuePayload>> {
        Ok(self.issues.clone())
    }

    async fn list_pull_requests(
        &self,
        _owner: &str,
        _repo: &str,
    ) -> Result<Vec<PullRequestPayload>> {
        Ok(self.pull_requests.clone())
    }

    async fn pull_request(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
    ) -> Result<PullRequestPayload> {
        self.pull_requests
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Not Found"))
    }
}

pub fn labeler(github: Arc<FakeGitHub>, config_yaml: &str) -> Labeler {
    let config = parse_config(config_yaml).unwrap();
    Labeler::new(
        Arc::new(StaticConfig(config)),
        github.clone(),
        github.clone(),
        github.clone(),
        github,
    )
}

pub fn fixture(name: &str) -> Vec<u8> {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read(&path).unwrap_or_else(|e| panic!("{path}: {e}"))
}

/// A pull request payload with the given number, title, head branch and state.
pub fn pull_request(number: u64, title: &str, branch: &str, state: &str) -> PullRequestPayload {
    serde_json::from_value(serde_json::json!({
        "number": number,
        "title": title,
        "body": "",
        "state": state,
        "user": { "login": "octo" },
        "draft": false,
        "mergeable": true,
        "mergeable_state": "clean",
        "author_association": "MEMBER",
        "additions": 10,
        "deletions": 5,
        "head": { "ref": branch },
        "base": {
            "ref": "main",
            "repo": { "name": "widgets", "owner": { "login": "acme" } }
        }
    }))
    .unwrap()
}

pub fn issue(number: u64, title: &str, state: Option<&str>) -> IssuePayload {
    serde_json::from_value(serde_json::json!({
        "number": number,
        "title": title,
        "state": state,
        "user": { "login": "octo" },
        "repository_url": "https://api.github.com/repos/acme/widgets"
    }))
    .unwrap()
}
