use regex::Regex;
use tracing::{debug, warn};

use super::ConditionResult;
use crate::config::{non_empty, LabelMatcher};
use crate::data::Target;
use crate::errors::ConditionError;
use crate::labeler::EvaluationContext;

/// Unanchored regex search. A pattern that fails to compile matches nothing.
pub(crate) fn search(pattern: &str, haystack: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(haystack),
        Err(err) => {
            warn!(pattern = %pattern, error = %err, "Ignoring invalid regex");
            false
        }
    }
}

fn match_field(
    name: &'static str,
    pattern: &Option<String>,
    value: Option<&str>,
) -> ConditionResult {
    let pattern = non_empty(pattern).ok_or(ConditionError::NotConfigured(name))?;
    let value = value.ok_or_else(|| ConditionError::Unavailable(format!("{name} of target")))?;
    debug!("Matching `{pattern}` against: `{value}`");
    Ok(search(pattern, value))
}

pub(super) fn title(target: &Target, clause: &LabelMatcher) -> ConditionResult {
    match_field("title", &clause.title, Some(target.title.as_str()))
}

pub(super) fn body(target: &Target, clause: &LabelMatcher) -> ConditionResult {
    match_field("body", &clause.body, Some(target.body.as_str()))
}

pub(super) fn branch(target: &Target, clause: &LabelMatcher) -> ConditionResult {
    let head = target.pull_request().map(|pr| pr.head.ref_name.as_str());
    match_field("branch", &clause.branch, head)
}

pub(super) fn base_branch(target: &Target, clause: &LabelMatcher) -> ConditionResult {
    let base = target.pull_request().map(|pr| pr.base.ref_name.as_str());
    match_field("base-branch", &clause.base_branch, base)
}

pub(super) async fn files(
    target: &Target,
    clause: &LabelMatcher,
    ctx: &mut EvaluationContext,
) -> ConditionResult {
    if clause.files.is_empty() {
        return Err(ConditionError::NotConfigured("files"));
    }
    if target.pull_request().is_none() {
        return Err(ConditionError::Unavailable("files of an issue".to_string()));
    }

    let changed = ctx.changed_files(target).await?;
    debug!(
        "Matching `{}` against: {}",
        clause.files.join(", "),
        changed.join(", ")
    );

    for pattern in &clause.files {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(err) => {
                warn!(pattern = %pattern, error = %err, "Ignoring invalid regex");
                continue;
            }
        };
        if let Some(file) = changed.iter().find(|f| re.is_match(f)) {
            debug!("Matched `{file}` against: `{pattern}`");
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn title_is_an_unanchored_search() {
        let target = pr_target(pull_request());
        let mut clause = LabelMatcher::new("WIP");

        clause.title = Some("^WIP:.*".to_string());
        assert!(title(&target, &clause).unwrap());

        clause.title = Some("feature".to_string());
        assert!(title(&target, &clause).unwrap());

        clause.title = Some("^feature".to_string());
        assert!(!title(&target, &clause).unwrap());
    }

    #[test]
    fn malformed_regex_does_not_match() {
        let target = pr_target(pull_request());
        let mut clause = LabelMatcher::new("broken");
        clause.title = Some("(WIP".to_string());
        assert!(!title(&target, &clause).unwrap());
    }

    #[test]
    fn empty_pattern_is_not_configured() {
        let target = pr_target(pull_request());
        let mut clause = LabelMatcher::new("x");
        clause.body = Some(String::new());
        assert!(matches!(
            body(&target, &clause),
            Err(ConditionError::NotConfigured("body"))
        ));
    }

    #[test]
    fn branches_read_head_and_base() {
        let target = pr_target(pull_request());
        let mut clause = LabelMatcher::new("b");
        clause.branch = Some("^feature/".to_string());
        clause.base_branch = Some("^main$".to_string());
        assert!(branch(&target, &clause).unwrap());
        assert!(base_branch(&target, &clause).unwrap());

        clause.base_branch = Some("^release".to_string());
        assert!(!base_branch(&target, &clause).unwrap());
    }

    #[tokio::test]
    async fn files_match_any_changed_path_and_share_the_diff() {
        let target = pr_target(pull_request());
        let (mut ctx, diffs) = context_at(chrono::Utc::now());

        let mut clause = LabelMatcher::new("docs");
        clause.files = vec!["[".to_string(), "\\.md$".to_string()];
        assert!(files(&target, &clause, &mut ctx).await.unwrap());

        clause.files = vec!["^src/gone\\.rs$".to_string()];
        assert!(files(&target, &clause, &mut ctx).await.unwrap());

        clause.files = vec!["\\.go$".to_string()];
        assert!(!files(&target, &clause, &mut ctx).await.unwrap());

        assert_eq!(diffs.calls.load(Ordering::SeqCst), 1);
    }
}
