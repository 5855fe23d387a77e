use std::collections::BTreeMap;

use crate::data::LabelUpdates;

/// Merge the desired state into the labels currently applied.
///
/// Labels no rule mentions keep their state. With `append_only`, a rule can
/// add a label but never remove one. The result is sorted.
pub fn reconcile(current: &[String], updates: &LabelUpdates, append_only: bool) -> Vec<String> {
    let mut intentions: BTreeMap<&str, bool> =
        current.iter().map(|label| (label.as_str(), true)).collect();

    for (label, desired) in updates.iter() {
        let intention = intentions.entry(label).or_insert(false);
        *intention = if append_only {
            *intention || desired
        } else {
            desired
        };
    }

    intentions
        .into_iter()
        .filter(|(_, keep)| *keep)
        .map(|(label, _)| label.to_string())
        .collect()
}
