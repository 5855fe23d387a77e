mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{issue, labeler, pull_request, FakeGitHub};
use prlabeler::labeler::BulkSummary;
use prlabeler::is_bulk_event;

const RULES: &str = r#"
version: 1
issues: true
labels:
  - label: WIP
    title: "^WIP"
  - label: feature
    branch: "^feature/"
"#;

#[test]
fn schedule_and_manual_runs_are_bulk() {
    assert!(is_bulk_event("schedule"));
    assert!(is_bulk_event("workflow_dispatch"));
    assert!(!is_bulk_event("pull_request"));
}

#[tokio::test]
async fn only_open_items_are_processed() {
    let github = Arc::new(FakeGitHub {
        pull_requests: vec![
            pull_request(1, "WIP: one", "feature/one", "open"),
            pull_request(2, "Two", "fix/two", "closed"),
            pull_request(3, "WIP: three", "fix/three", "OPEN"),
        ],
        issues: vec![
            issue(10, "WIP: open issue", Some("open")),
            issue(11, "WIP: closed issue", Some("closed")),
            issue(12, "WIP: stateless issue", None),
        ],
        ..Default::default()
    });
    let labeler = labeler(github.clone(), RULES);

    let summary = labeler.process_repository("acme", "widgets").await.unwrap();

    assert_eq!(
        summary,
        BulkSummary {
            processed: 3,
            skipped: 3,
            failed: 0,
        }
    );
    assert_eq!(github.replaced_numbers(), vec![1, 3, 10]);

    let labels = github.labels.lock().unwrap();
    assert_eq!(labels[&1], vec!["WIP", "feature"]);
    assert_eq!(labels[&3], vec!["WIP"]);
    assert_eq!(labels[&10], vec!["WIP"]);
}

#[tokio::test]
async fn issues_need_to_be_enabled() {
    let github = Arc::new(FakeGitHub {
        pull_requests: vec![pull_request(1, "WIP: one", "feature/one", "open")],
        issues: vec![issue(10, "WIP: open issue", Some("open"))],
        ..Default::default()
    });
    let labeler = labeler(github.clone(), &RULES.replace("issues: true", "issues: false"));

    labeler.process_repository("acme", "widgets").await.unwrap();

    assert_eq!(github.replaced_numbers(), vec![1]);
}

#[tokio::test]
async fn listed_pull_requests_are_not_processed_as_issues() {
    let mut as_issue = issue(1, "WIP: one", Some("open"));
    as_issue.pull_request = Some(serde_json::json!({
        "url": "https://api.github.com/repos/acme/widgets/pulls/1"
    }));
    let github = Arc::new(FakeGitHub {
        pull_requests: vec![pull_request(1, "WIP: one", "feature/one", "open")],
        issues: vec![as_issue],
        ..Default::default()
    });
    let labeler = labeler(github.clone(), RULES);

    labeler.process_repository("acme", "widgets").await.unwrap();

    assert_eq!(github.replaced_numbers(), vec![1]);
}

#[tokio::test]
async fn a_failing_item_does_not_stop_the_run() {
    let github = Arc::new(FakeGitHub {
        pull_requests: vec![
            pull_request(1, "WIP: one", "feature/one", "open"),
            pull_request(2, "WIP: two", "feature/two", "open"),
            pull_request(3, "WIP: three", "feature/three", "open"),
        ],
        fail_replace_for: HashSet::from([2]),
        ..Default::default()
    });
    let labeler = labeler(github.clone(), RULES);

    let summary = labeler.process_repository("acme", "widgets").await.unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(github.replaced_numbers(), vec![1, 3]);
}
