//! The predicates a rule clause can combine.
//!
//! Every condition reads one parameter of a [`LabelMatcher`]. A parameter
//! the clause leaves unset yields [`ConditionError::NotConfigured`], which
//! the matcher skips rather than counting as a mismatch.

mod age;
mod author;
mod pull_request;
mod text;

use tracing::debug;

use super::context::EvaluationContext;
use crate::config::{lenient, non_empty, LabelMatcher};
use crate::data::{Target, TargetType};
use crate::errors::ConditionError;

pub type ConditionResult = Result<bool, ConditionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Title,
    Branch,
    BaseBranch,
    Mergeable,
    Draft,
    Size,
    Body,
    Files,
    Author,
    AuthorCanMerge,
    AuthorInTeam,
    Age,
    LastModified,
    Type,
}

impl Condition {
    /// Evaluation order within a clause.
    pub const ALL: [Condition; 14] = [
        Condition::Title,
        Condition::Branch,
        Condition::BaseBranch,
        Condition::Mergeable,
        Condition::Draft,
        Condition::Size,
        Condition::Body,
        Condition::Files,
        Condition::Author,
        Condition::AuthorCanMerge,
        Condition::AuthorInTeam,
        Condition::Age,
        Condition::LastModified,
        Condition::Type,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Condition::Title => "Title matches regex",
            Condition::Branch => "Branch matches regex",
            Condition::BaseBranch => "Base branch matches regex",
            Condition::Mergeable => "Pull request is mergeable",
            Condition::Draft => "Pull request is draft",
            Condition::Size => "Pull request contains a number of changes",
            Condition::Body => "Body matches regex",
            Condition::Files => "File matches regex",
            Condition::Author => "Author matches",
            Condition::AuthorCanMerge => "Author can merge",
            Condition::AuthorInTeam => "Author is member of team",
            Condition::Age => "Age of issue/PR",
            Condition::LastModified => "Last modification of issue/PR",
            Condition::Type => "Target type matches defined type",
        }
    }

    /// Whether this condition has anything to say about `target`.
    pub fn can_evaluate(self, target: &Target) -> bool {
        match self {
            Condition::Branch
            | Condition::BaseBranch
            | Condition::Mergeable
            | Condition::Draft
            | Condition::Size
            | Condition::Files
            | Condition::AuthorCanMerge => target.pull_request().is_some(),
            Condition::Title
            | Condition::Body
            | Condition::Author
            | Condition::AuthorInTeam
            | Condition::Age
            | Condition::LastModified
            | Condition::Type => true,
        }
    }

    pub async fn evaluate(
        self,
        target: &Target,
        clause: &LabelMatcher,
        ctx: &mut EvaluationContext,
    ) -> ConditionResult {
        match self {
            Condition::Title => text::title(target, clause),
            Condition::Branch => text::branch(target, clause),
            Condition::BaseBranch => text::base_branch(target, clause),
            Condition::Mergeable => pull_request::mergeable(target, clause),
            Condition::Draft => pull_request::draft(target, clause),
            Condition::Size => pull_request::size(target, clause, ctx).await,
            Condition::Body => text::body(target, clause),
            Condition::Files => text::files(target, clause, ctx).await,
            Condition::Author => author::author(target, clause),
            Condition::AuthorCanMerge => author::can_merge(target, clause),
            Condition::AuthorInTeam => author::in_team(target, clause, ctx).await,
            Condition::Age => age::age(target, clause, ctx.now()),
            Condition::LastModified => age::last_modified(target, clause, ctx.now()),
            Condition::Type => target_type(target, clause),
        }
    }
}

/// A boolean parameter as written in the rule set.
fn bool_param(name: &'static str, raw: &Option<String>) -> Result<bool, ConditionError> {
    let raw = non_empty(raw).ok_or(ConditionError::NotConfigured(name))?;
    lenient::parse_bool(raw).ok_or_else(|| {
        ConditionError::InvalidConfig(format!("{name} doesn't have a valid value `{raw}`"))
    })
}

fn target_type(target: &Target, clause: &LabelMatcher) -> ConditionResult {
    let raw = non_empty(&clause.target_type)
        .ok_or(ConditionError::NotConfigured("type"))?;
    let expected: TargetType = raw.parse().map_err(ConditionError::InvalidConfig)?;
    let actual = target.target_type();
    debug!(expected = expected.to_str(), actual = actual.to_str(), "Matching type");
    Ok(expected == TargetType::All || expected == actual)
}
