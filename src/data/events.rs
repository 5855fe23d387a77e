use serde::Deserialize;

use super::types::{IssuePayload, PullRequestPayload};

#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub action: Option<String>,
    pub pull_request: PullRequestPayload,
}

#[derive(Debug, Deserialize)]
pub struct IssuesEvent {
    #[serde(default)]
    pub action: Option<String>,
    pub issue: IssuePayload,
}

/// An inbound webhook event, discriminated by its event name.
#[derive(Debug)]
pub enum WebhookEvent {
    PullRequest(PullRequestEvent),
    PullRequestTarget(PullRequestEvent),
    Issues(IssuesEvent),
    Unsupported(String),
}

impl WebhookEvent {
    /// Decode `payload` according to `event_name` (the `X-GitHub-Event`
    /// header or `GITHUB_EVENT_NAME`). Unknown names are not an error.
    pub fn parse(event_name: &str, payload: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match event_name {
            "pull_request" => WebhookEvent::PullRequest(serde_json::from_slice(payload)?),
            "pull_request_target" => {
                WebhookEvent::PullRequestTarget(serde_json::from_slice(payload)?)
            }
            "issues" => WebhookEvent::Issues(serde_json::from_slice(payload)?),
            other => WebhookEvent::Unsupported(other.to_string()),
        })
    }

    pub fn action(&self) -> Option<&str> {
        match self {
            WebhookEvent::PullRequest(e) | WebhookEvent::PullRequestTarget(e) => {
                e.action.as_deref()
            }
            WebhookEvent::Issues(e) => e.action.as_deref(),
            WebhookEvent::Unsupported(_) => None,
        }
    }
}
