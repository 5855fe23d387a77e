use serde::Deserialize;

use super::lenient;

/// One rule clause: a label plus the conditions that must all hold for it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LabelMatcher {
    #[serde(deserialize_with = "lenient::scalar")]
    pub label: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub branch: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub base_branch: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub body: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub files: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub authors: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub author_can_merge: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub author_in_team: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub mergeable: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub draft: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub size_above: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub size_below: Option<String>,
    pub size: Option<SizeConfig>,
    pub age: Option<AgeSetting>,
    pub last_modified: Option<AgeRange>,
    #[serde(rename = "type", deserialize_with = "lenient::opt_string")]
    pub target_type: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub negate: bool,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
}

/// Structured size rule, able to leave some files out of the count.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SizeConfig {
    #[serde(deserialize_with = "lenient::string_list")]
    pub exclude_files: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub above: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub below: Option<String>,
}

/// `age: 7d` (at least) or `age: { at-least: 7d, at-most: 30d }`.
///
/// Any scalar is taken as the lower bound; it is validated when the
/// condition runs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AgeSetting {
    #[serde(deserialize_with = "lenient::scalar")]
    AtLeast(String),
    Range(AgeRange),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AgeRange {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub at_least: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub at_most: Option<String>,
}

impl AgeRange {
    pub fn at_least(&self) -> Option<&str> {
        non_empty(&self.at_least)
    }

    pub fn at_most(&self) -> Option<&str> {
        non_empty(&self.at_most)
    }

    pub fn is_empty(&self) -> bool {
        self.at_least().is_none() && self.at_most().is_none()
    }
}

/// Treat `Some("")` the same as an absent parameter.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl LabelMatcher {
    pub fn new(label: impl Into<String>) -> Self {
        LabelMatcher {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn has_legacy_size(&self) -> bool {
        non_empty(&self.size_above).is_some() || non_empty(&self.size_below).is_some()
    }

    /// The size rule in effect: the structured form when present,
    /// otherwise one built from `size-above`/`size-below`.
    pub fn effective_size(&self) -> Option<SizeConfig> {
        if let Some(size) = &self.size {
            return Some(size.clone());
        }
        if !self.has_legacy_size() {
            return None;
        }
        Some(SizeConfig {
            exclude_files: Vec::new(),
            above: self.size_above.clone(),
            below: self.size_below.clone(),
        })
    }

    pub fn has_label_settings(&self) -> bool {
        non_empty(&self.color).is_some() || non_empty(&self.description).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_kebab_case_parameters() {
        let matcher: LabelMatcher = serde_yaml::from_str(
            r#"
label: M
base-branch: "^main$"
author-can-merge: "True"
size:
  exclude-files: ["test.yaml"]
  above: 9
  below: "100"
last-modified:
  at-least: 2w
type: pull_request
negate: true
"#,
        )
        .unwrap();

        assert_eq!(matcher.label, "M");
        assert_eq!(matcher.base_branch.as_deref(), Some("^main$"));
        assert_eq!(matcher.author_can_merge.as_deref(), Some("True"));
        assert_eq!(
            matcher.size,
            Some(SizeConfig {
                exclude_files: vec!["test.yaml".to_string()],
                above: Some("9".to_string()),
                below: Some("100".to_string()),
            })
        );
        assert_eq!(
            matcher.last_modified.as_ref().and_then(|r| r.at_least()),
            Some("2w")
        );
        assert_eq!(matcher.target_type.as_deref(), Some("pull_request"));
        assert!(matcher.negate);
    }

    #[test]
    fn age_accepts_both_forms() {
        let legacy: LabelMatcher = serde_yaml::from_str("label: old\nage: 7d").unwrap();
        assert_eq!(legacy.age, Some(AgeSetting::AtLeast("7d".to_string())));

        let range: LabelMatcher =
            serde_yaml::from_str("label: old\nage:\n  at-most: 30d\n").unwrap();
        assert_eq!(
            range.age,
            Some(AgeSetting::Range(AgeRange {
                at_least: None,
                at_most: Some("30d".to_string()),
            }))
        );
    }

    #[test]
    fn scalar_parameters_are_kept_as_written() {
        let matcher: LabelMatcher = serde_yaml::from_str(
            r#"
label: 2024
title: 123
branch: 2024
draft: maybe
mergeable: false
age: 30
authors: [1337, octocat]
"#,
        )
        .unwrap();

        assert_eq!(matcher.label, "2024");
        assert_eq!(matcher.title.as_deref(), Some("123"));
        assert_eq!(matcher.branch.as_deref(), Some("2024"));
        assert_eq!(matcher.draft.as_deref(), Some("maybe"));
        assert_eq!(matcher.mergeable.as_deref(), Some("false"));
        assert_eq!(matcher.age, Some(AgeSetting::AtLeast("30".to_string())));
        assert_eq!(matcher.authors, vec!["1337".to_string(), "octocat".to_string()]);
    }

    #[test]
    fn structured_size_wins_over_legacy_fields() {
        let mut matcher = LabelMatcher::new("L");
        matcher.size_above = Some("1".to_string());
        assert_eq!(
            matcher.effective_size().and_then(|s| s.above),
            Some("1".to_string())
        );

        matcher.size = Some(SizeConfig {
            above: Some("100".to_string()),
            ..Default::default()
        });
        assert_eq!(
            matcher.effective_size().and_then(|s| s.above),
            Some("100".to_string())
        );
    }
}
