use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::data::{Target, TargetKey};
use crate::services::{DiffProvider, TeamDirectory};
use crate::utils::changed_files;

#[derive(Debug, Default)]
struct CachedDiff {
    raw: String,
    files: Vec<String>,
}

/// Collaborators and scratch state shared by the conditions of one
/// evaluation pass. Diffs are fetched at most once per target and dropped
/// with the context.
pub struct EvaluationContext {
    diffs: Arc<dyn DiffProvider>,
    teams: Arc<dyn TeamDirectory>,
    now: DateTime<Utc>,
    cache: HashMap<TargetKey, CachedDiff>,
}

impl EvaluationContext {
    pub fn new(diffs: Arc<dyn DiffProvider>, teams: Arc<dyn TeamDirectory>) -> Self {
        Self::at(diffs, teams, Utc::now())
    }

    /// Context with a fixed clock, for age-based rules.
    pub fn at(
        diffs: Arc<dyn DiffProvider>,
        teams: Arc<dyn TeamDirectory>,
        now: DateTime<Utc>,
    ) -> Self {
        EvaluationContext {
            diffs,
            teams,
            now,
            cache: HashMap::new(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn teams(&self) -> &dyn TeamDirectory {
        self.teams.as_ref()
    }

    async fn diff_entry(&mut self, target: &Target) -> Result<&CachedDiff> {
        let key = target.key();
        if !self.cache.contains_key(&key) {
            debug!(item = %key, "Loading diff");
            let raw = self
                .diffs
                .raw_diff(&target.owner, &target.repo_name, target.number)
                .await?;
            let files = changed_files(&raw);
            self.cache.insert(key.clone(), CachedDiff { raw, files });
        }
        Ok(&self.cache[&key])
    }

    pub async fn raw_diff(&mut self, target: &Target) -> Result<&str> {
        Ok(self.diff_entry(target).await?.raw.as_str())
    }

    /// Changed file names (old and new) of a pull request.
    pub async fn changed_files(&mut self, target: &Target) -> Result<&[String]> {
        Ok(self.diff_entry(target).await?.files.as_slice())
    }
}
