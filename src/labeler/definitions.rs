use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::{non_empty, LabelerConfig};
use crate::data::{LabelDefinition, LabelPayload};
use crate::services::LabelCatalog;

/// Color and description requested for each label, first clause wins.
pub fn requested_definitions(config: &LabelerConfig) -> BTreeMap<String, (String, String)> {
    let mut requested = BTreeMap::new();
    for clause in config.labels.iter().filter(|c| c.has_label_settings()) {
        requested.entry(clause.label.clone()).or_insert_with(|| {
            (
                non_empty(&clause.color)
                    .map(|c| c.trim_start_matches('#').to_string())
                    .unwrap_or_default(),
                non_empty(&clause.description)
                    .map(str::to_string)
                    .unwrap_or_default(),
            )
        });
    }
    requested
}

fn or_existing(new: &str, old: Option<&str>) -> String {
    if new.is_empty() {
        old.unwrap_or_default().to_string()
    } else {
        new.to_string()
    }
}

/// Definition to write for `name`, or `None` when the stored one matches.
fn plan(
    name: &str,
    color: &str,
    description: &str,
    existing: Option<&LabelPayload>,
) -> Option<LabelDefinition> {
    let wanted = LabelDefinition {
        name: name.to_string(),
        color: or_existing(color, existing.and_then(|l| l.color.as_deref())),
        description: or_existing(description, existing.and_then(|l| l.description.as_deref())),
    };

    match existing {
        Some(label)
            if label.color.as_deref().unwrap_or_default().eq_ignore_ascii_case(&wanted.color)
                && label.description.as_deref().unwrap_or_default() == wanted.description =>
        {
            None
        }
        _ => Some(wanted),
    }
}

/// Create or update repository labels whose rule carries a color or
/// description. Individual failures are logged and skipped.
pub async fn sync_label_definitions(
    catalog: &dyn LabelCatalog,
    owner: &str,
    repo: &str,
    config: &LabelerConfig,
) -> Result<()> {
    let requested = requested_definitions(config);
    if requested.is_empty() {
        return Ok(());
    }

    let existing: BTreeMap<String, LabelPayload> = catalog
        .repo_labels(owner, repo)
        .await?
        .into_iter()
        .map(|label| (label.name.clone(), label))
        .collect();

    for (name, (color, description)) in &requested {
        let current = existing.get(name);
        let Some(definition) = plan(name, color, description, current) else {
            debug!(label = %name, "Label definition up to date");
            continue;
        };

        let result = if current.is_some() {
            info!(label = %name, color = %definition.color, "Updating label definition");
            catalog.update_label(owner, repo, &definition).await
        } else {
            info!(label = %name, color = %definition.color, "Creating label");
            catalog.create_label(owner, repo, &definition).await
        };

        if let Err(e) = result {
            warn!(label = %name, "Unable to sync label definition: {e:#}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelMatcher;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeCatalog {
        labels: Vec<LabelPayload>,
        created: Mutex<Vec<LabelDefinition>>,
        updated: Mutex<Vec<LabelDefinition>>,
    }

    #[async_trait]
    impl LabelCatalog for FakeCatalog {
        async fn repo_labels(&self, _owner: &str, _repo: &str) -> Result<Vec<LabelPayload>> {
            Ok(self.labels.clone())
        }

        async fn create_label(&self, _o: &str, _r: &str, label: &LabelDefinition) -> Result<()> {
            if label.name == "broken" {
                anyhow::bail!("validation failed");
            }
            self.created.lock().unwrap().push(label.clone());
            Ok(())
        }

        async fn update_label(&self, _o: &str, _r: &str, label: &LabelDefinition) -> Result<()> {
            self.updated.lock().unwrap().push(label.clone());
            Ok(())
        }
    }

    fn styled(label: &str, color: Option<&str>, description: Option<&str>) -> LabelMatcher {
        let mut clause = LabelMatcher::new(label);
        clause.color = color.map(str::to_string);
        clause.description = description.map(str::to_string);
        clause
    }

    fn existing(name: &str, color: &str, description: &str) -> LabelPayload {
        LabelPayload {
            name: name.to_string(),
            color: Some(color.to_string()),
            description: Some(description.to_string()),
        }
    }

    #[tokio::test]
    async fn creates_missing_and_updates_changed_labels() {
        let catalog = FakeCatalog {
            labels: vec![
                existing("bug", "d73a4a", "Something isn't working"),
                existing("S", "00ff00", "Small"),
            ],
            ..Default::default()
        };
        let config = LabelerConfig {
            labels: vec![
                styled("bug", Some("#D73A4A"), None),
                styled("S", Some("#0000ff"), None),
                styled("WIP", Some("#ff0000"), Some("Work in progress")),
                styled("WIP", Some("#000000"), None),
                LabelMatcher::new("plain"),
            ],
            ..Default::default()
        };

        sync_label_definitions(&catalog, "acme", "widgets", &config)
            .await
            .unwrap();

        assert_eq!(
            *catalog.created.lock().unwrap(),
            vec![LabelDefinition {
                name: "WIP".to_string(),
                color: "ff0000".to_string(),
                description: "Work in progress".to_string(),
            }]
        );
        assert_eq!(
            *catalog.updated.lock().unwrap(),
            vec![LabelDefinition {
                name: "S".to_string(),
                color: "0000ff".to_string(),
                description: "Small".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_sync() {
        let catalog = FakeCatalog::default();
        let config = LabelerConfig {
            labels: vec![
                styled("broken", Some("ffffff"), None),
                styled("fine", Some("eeeeee"), None),
            ],
            ..Default::default()
        };

        sync_label_definitions(&catalog, "acme", "widgets", &config)
            .await
            .unwrap();
        assert_eq!(catalog.created.lock().unwrap().len(), 1);
    }
}
