use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use super::ConditionResult;
use crate::config::{AgeRange, AgeSetting, LabelMatcher};
use crate::data::Target;
use crate::errors::ConditionError;
use crate::labeler::parse_extended_duration;

fn bound(param: &str, raw: &str) -> Result<Duration, ConditionError> {
    parse_extended_duration(raw)
        .map_err(|err| ConditionError::InvalidConfig(format!("failed to parse `{param}`: {err}")))
}

fn elapsed_since(ts: Option<DateTime<Utc>>, what: &str, now: DateTime<Utc>) -> Result<Duration, ConditionError> {
    let ts = ts.ok_or_else(|| ConditionError::Unavailable(format!("{what} timestamp")))?;
    // Timestamps in the future count as zero elapsed time
    Ok((now - ts).to_std().unwrap_or_default())
}

fn within(param: &str, range: &AgeRange, elapsed: Duration) -> ConditionResult {
    if let Some(raw) = range.at_least() {
        if elapsed < bound(&format!("{param}.at-least"), raw)? {
            return Ok(false);
        }
    }
    if let Some(raw) = range.at_most() {
        if elapsed > bound(&format!("{param}.at-most"), raw)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub(super) fn age(target: &Target, clause: &LabelMatcher, now: DateTime<Utc>) -> ConditionResult {
    match &clause.age {
        None => Err(ConditionError::NotConfigured("age")),
        Some(AgeSetting::AtLeast(raw)) if raw.is_empty() => {
            Err(ConditionError::NotConfigured("age"))
        }
        Some(AgeSetting::AtLeast(raw)) => {
            let min = bound("age", raw)?;
            let elapsed = elapsed_since(target.created_at(), "creation", now)?;
            debug!(?elapsed, ?min, "Matching age");
            Ok(elapsed > min)
        }
        Some(AgeSetting::Range(range)) if range.is_empty() => {
            Err(ConditionError::NotConfigured("age"))
        }
        Some(AgeSetting::Range(range)) => {
            let elapsed = elapsed_since(target.created_at(), "creation", now)?;
            within("age", range, elapsed)
        }
    }
}

pub(super) fn last_modified(
    target: &Target,
    clause: &LabelMatcher,
    now: DateTime<Utc>,
) -> ConditionResult {
    let range = clause
        .last_modified
        .as_ref()
        .filter(|r| !r.is_empty())
        .ok_or(ConditionError::NotConfigured("last-modified"))?;
    let elapsed = elapsed_since(target.updated_at(), "last update", now)?;
    debug!(?elapsed, "Matching last modification");
    within("last-modified", range, elapsed)
}
