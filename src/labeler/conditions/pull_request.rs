use tracing::{debug, warn};

use super::{bool_param, ConditionResult};
use crate::config::{non_empty, LabelMatcher};
use crate::data::{MergeState, PullRequestPayload, Target};
use crate::errors::ConditionError;
use crate::labeler::EvaluationContext;
use crate::utils::count_changed_lines;

fn require_pr<'a>(target: &'a Target, what: &str) -> Result<&'a PullRequestPayload, ConditionError> {
    target
        .pull_request()
        .ok_or_else(|| ConditionError::Unavailable(format!("{what} only applies to pull requests")))
}

/// Mergeable means GitHub computed a clean merge, not only that the flag is set.
pub(super) fn mergeable(target: &Target, clause: &LabelMatcher) -> ConditionResult {
    let expected = bool_param("mergeable", &clause.mergeable)?;
    let pr = require_pr(target, "mergeable")?;

    let state: MergeState = pr
        .mergeable_state
        .as_deref()
        .unwrap_or_default()
        .parse()
        .unwrap_or(MergeState::Unknown);
    let is_mergeable = pr.mergeable == Some(true) && state == MergeState::Clean;
    debug!(expected, is_mergeable, state = ?state, "Matching mergeable");
    Ok(expected == is_mergeable)
}

pub(super) fn draft(target: &Target, clause: &LabelMatcher) -> ConditionResult {
    let expected = bool_param("draft", &clause.draft)?;
    let pr = require_pr(target, "draft")?;
    Ok(expected == pr.draft)
}

pub(super) async fn size(
    target: &Target,
    clause: &LabelMatcher,
    ctx: &mut EvaluationContext,
) -> ConditionResult {
    if clause.size.is_some() && clause.has_legacy_size() {
        warn!(
            label = %clause.label,
            "Both `size-above`/`size-below` and `size` are set; only `size` is applied"
        );
    }
    let config = clause
        .effective_size()
        .ok_or(ConditionError::NotConfigured("size"))?;
    let pr = require_pr(target, "size")?;

    let upper = match non_empty(&config.below).map(|s| s.trim().parse::<i64>()) {
        Some(Ok(bound)) => bound,
        _ => {
            debug!("Upper boundary unbounded (config has invalid or empty value)");
            i64::MAX
        }
    };
    let lower = match non_empty(&config.above).map(|s| s.trim().parse::<i64>()) {
        Some(Ok(bound)) if bound >= 0 => bound,
        _ => {
            debug!("Lower boundary set to 0 (config has invalid or empty value)");
            0
        }
    };

    let changes = if config.exclude_files.is_empty() {
        pr.additions.saturating_add(pr.deletions)
    } else {
        let diff = ctx.raw_diff(target).await?;
        count_changed_lines(diff, &config.exclude_files)
    };
    let changes = i64::try_from(changes).unwrap_or(i64::MAX);

    debug!("Matching {changes} changes in PR against bounds: ({lower}, {upper})");
    Ok(lower < changes && changes < upper)
}
