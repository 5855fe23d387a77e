use tracing::debug;

use super::{bool_param, ConditionResult};
use crate::config::{non_empty, LabelMatcher};
use crate::data::{AuthorAssociation, Target};
use crate::errors::ConditionError;
use crate::labeler::EvaluationContext;

pub(super) fn author(target: &Target, clause: &LabelMatcher) -> ConditionResult {
    if clause.authors.is_empty() {
        return Err(ConditionError::NotConfigured("authors"));
    }
    debug!("Matching `{:?}` against: `{}`", clause.authors, target.author);
    Ok(clause
        .authors
        .iter()
        .any(|a| a.to_lowercase() == target.author.to_lowercase()))
}

pub(super) fn can_merge(target: &Target, clause: &LabelMatcher) -> ConditionResult {
    let expected = bool_param("author-can-merge", &clause.author_can_merge)?;
    let pr = target.pull_request().ok_or_else(|| {
        ConditionError::Unavailable("author association of an issue".to_string())
    })?;

    let association: AuthorAssociation = pr
        .author_association
        .as_deref()
        .unwrap_or_default()
        .parse()
        .unwrap_or(AuthorAssociation::None);
    let can_merge = association.can_merge();
    debug!(author = %target.author, can_merge, "Checking merge rights");
    Ok(expected == can_merge)
}

/// Team lookups run against the organization that owns the repository.
pub(super) async fn in_team(
    target: &Target,
    clause: &LabelMatcher,
    ctx: &mut EvaluationContext,
) -> ConditionResult {
    let team = non_empty(&clause.author_in_team)
        .ok_or(ConditionError::NotConfigured("author-in-team"))?;
    let member = ctx
        .teams()
        .is_member(&target.owner, &target.author, team)
        .await?;
    Ok(member)
}
