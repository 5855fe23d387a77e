use anyhow::{Context, Result};
use tracing::{debug, info};

use super::conditions::Condition;
use super::context::EvaluationContext;
use crate::config::LabelMatcher;
use crate::data::{LabelUpdates, Target};

/// AND-fold every applicable, configured condition of one clause.
///
/// Returns `None` when no condition produced a verdict. `negate` only flips
/// an actual verdict; a silent clause stays silent.
pub async fn evaluate_clause(
    target: &Target,
    clause: &LabelMatcher,
    ctx: &mut EvaluationContext,
) -> Result<Option<bool>> {
    let mut verdict: Option<bool> = None;

    for condition in Condition::ALL {
        if !condition.can_evaluate(target) {
            debug!(condition = condition.name(), "Skipping inapplicable condition");
            continue;
        }

        match condition.evaluate(target, clause, ctx).await {
            Ok(matched) => {
                debug!(
                    label = %clause.label,
                    condition = condition.name(),
                    matched,
                    "Evaluated condition"
                );
                verdict = Some(verdict.unwrap_or(true) && matched);
            }
            Err(err) if err.is_skip() => {
                debug!(
                    label = %clause.label,
                    condition = condition.name(),
                    reason = %err,
                    "Condition skipped"
                );
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)).with_context(|| {
                    format!("{} failed for label `{}`", condition.name(), clause.label)
                });
            }
        }
    }

    Ok(match verdict {
        Some(matched) if clause.negate => Some(!matched),
        other => other,
    })
}

/// Desired state for every label the rule set has an opinion on.
///
/// Clauses sharing a label are OR-ed: once one of them matched, later
/// ones are not evaluated.
pub async fn find_matches(
    target: &Target,
    clauses: &[LabelMatcher],
    ctx: &mut EvaluationContext,
) -> Result<LabelUpdates> {
    let mut updates = LabelUpdates::default();

    for clause in clauses {
        if updates.get(&clause.label) == Some(true) {
            continue;
        }
        updates.remove(&clause.label);

        if let Some(matched) = evaluate_clause(target, clause, ctx).await? {
            info!(item = %target.key(), label = %clause.label, matched, "Rule evaluated");
            updates.set(&clause.label, matched);
        }
    }

    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeler::conditions::fixtures::*;

    fn titled(label: &str, pattern: &str) -> LabelMatcher {
        let mut clause = LabelMatcher::new(label);
        clause.title = Some(pattern.to_string());
        clause
    }

    fn branched(label: &str, pattern: &str) -> LabelMatcher {
        let mut clause = LabelMatcher::new(label);
        clause.branch = Some(pattern.to_string());
        clause
    }

    #[tokio::test]
    async fn conditions_are_and_combined() {
        let target = pr_target(pull_request());
        let mut ctx = context();

        let mut clause = titled("WIP", "^WIP:");
        clause.base_branch = Some("^main$".to_string());
        assert_eq!(
            evaluate_clause(&target, &clause, &mut ctx).await.unwrap(),
            Some(true)
        );

        clause.draft = Some("true".to_string());
        assert_eq!(
            evaluate_clause(&target, &clause, &mut ctx).await.unwrap(),
            Some(false)
        );
    }

    #[tokio::test]
    async fn clause_without_parameters_has_no_verdict() {
        let target = pr_target(pull_request());
        let mut ctx = context();
        assert_eq!(
            evaluate_clause(&target, &LabelMatcher::new("noop"), &mut ctx)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn negate_flips_verdicts_only() {
        let target = issue_target(issue());
        let mut ctx = context();

        let mut clause = titled("NotCrash", "Crash");
        clause.negate = true;
        assert_eq!(
            evaluate_clause(&target, &clause, &mut ctx).await.unwrap(),
            Some(false)
        );

        // Mergeable does not apply to issues, so there is nothing to negate
        let mut clause = LabelMatcher::new("NotMergeable");
        clause.mergeable = Some("true".to_string());
        clause.negate = true;
        assert_eq!(
            evaluate_clause(&target, &clause, &mut ctx).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn invalid_type_is_skipped_not_false() {
        let target = pr_target(pull_request());
        let mut ctx = context();
        let mut clause = titled("WIP", "^WIP:");
        clause.target_type = Some("discussion".to_string());
        assert_eq!(
            evaluate_clause(&target, &clause, &mut ctx).await.unwrap(),
            Some(true)
        );
    }

    #[tokio::test]
    async fn unreadable_flag_skips_only_that_condition() {
        let target = pr_target(pull_request());
        let mut ctx = context();

        let mut draft = titled("Draft", "^WIP:");
        draft.draft = Some("maybe".to_string());
        let clauses = vec![titled("WIP", "^WIP"), draft];

        let updates = find_matches(&target, &clauses, &mut ctx).await.unwrap();
        assert_eq!(updates.get("WIP"), Some(true));
        assert_eq!(updates.get("Draft"), Some(true));
    }

    #[tokio::test]
    async fn clauses_for_one_label_are_or_combined() {
        let target = pr_target(pull_request());

        for clauses in [
            vec![branched("Branch", "^feature/"), branched("Branch", "^hotfix/")],
            vec![branched("Branch", "^hotfix/"), branched("Branch", "^feature/")],
        ] {
            let mut ctx = context();
            let updates = find_matches(&target, &clauses, &mut ctx).await.unwrap();
            assert_eq!(updates.get("Branch"), Some(true));
        }

        let mut ctx = context();
        let clauses = vec![branched("Branch", "^hotfix/"), branched("Branch", "^release/")];
        let updates = find_matches(&target, &clauses, &mut ctx).await.unwrap();
        assert_eq!(updates.get("Branch"), Some(false));
    }

    #[tokio::test]
    async fn later_silent_clause_discards_earlier_false() {
        let target = issue_target(issue());
        let mut ctx = context();

        let mut silent = LabelMatcher::new("Ready");
        silent.mergeable = Some("true".to_string());
        let clauses = vec![titled("Ready", "^Ready"), silent];

        let updates = find_matches(&target, &clauses, &mut ctx).await.unwrap();
        assert_eq!(updates.get("Ready"), None);
    }

    #[tokio::test]
    async fn team_lookup_failure_aborts_the_target() {
        use crate::labeler::EvaluationContext;
        use std::sync::Arc;

        let target = pr_target(pull_request());
        let mut ctx = EvaluationContext::new(
            Arc::new(FakeDiffs::default()),
            Arc::new(FakeTeams {
                members: Vec::new(),
                fail: true,
            }),
        );
        let mut clause = titled("Core", "WIP");
        clause.author_in_team = Some("core".to_string());

        let err = find_matches(&target, &[clause], &mut ctx).await.unwrap_err();
        assert!(format!("{err:#}").contains("read:org"));
    }
}
