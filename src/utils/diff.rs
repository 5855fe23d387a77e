//! Helpers over raw unified diff text, as returned by the pull request
//! `diff` media type.

use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, warn};

const DEV_NULL: &str = "/dev/null";

/// A `--- old` / `+++ new` header pair announcing a file block.
struct FileHeader<'a> {
    old: Option<&'a str>,
    new: Option<&'a str>,
}

impl<'a> FileHeader<'a> {
    /// The path the block is attributed to: the new name, or the old one
    /// when the file was deleted.
    fn path(&self) -> Option<&'a str> {
        self.new.or(self.old)
    }
}

fn header_path(raw: &str) -> Option<&str> {
    let path = raw.trim();
    if path == DEV_NULL {
        return None;
    }
    Some(
        path.strip_prefix("a/")
            .or_else(|| path.strip_prefix("b/"))
            .unwrap_or(path),
    )
}

/// Recognise a file header at `lines[idx]`, which must be a `---` line
/// directly followed by a `+++` line.
fn file_header<'a>(lines: &[&'a str], idx: usize) -> Option<FileHeader<'a>> {
    let old = lines[idx].strip_prefix("---")?;
    let new = lines.get(idx + 1)?.strip_prefix("+++")?;
    Some(FileHeader {
        old: header_path(old),
        new: header_path(new),
    })
}

/// All file names touched by the diff, old and new, deduplicated.
pub fn changed_files(diff: &str) -> Vec<String> {
    let lines: Vec<&str> = diff.lines().collect();
    let mut files = BTreeSet::new();

    for (idx, line) in lines.iter().enumerate() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            // Renames and mode changes have no ---/+++ pair
            if let Some((old, new)) = rest.split_once(" b/") {
                files.insert(old.strip_prefix("a/").unwrap_or(old).to_string());
                files.insert(new.to_string());
            }
        } else if let Some(header) = file_header(&lines, idx) {
            files.extend(header.old.map(str::to_string));
            files.extend(header.new.map(str::to_string));
        }
    }

    files.into_iter().collect()
}

/// Count added and removed lines, ignoring file blocks whose path matches
/// any of the `exclusions` regexes. Invalid exclusion patterns are ignored.
pub fn count_changed_lines(diff: &str, exclusions: &[String]) -> u64 {
    let exclusions: Vec<Regex> = exclusions
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Ignoring invalid file exclusion regex");
                None
            }
        })
        .collect();

    let lines: Vec<&str> = diff.lines().collect();
    let mut count = 0;
    let mut counting = false;
    let mut idx = 0;

    while idx < lines.len() {
        if let Some(header) = file_header(&lines, idx) {
            let path = header.path().unwrap_or_default();
            counting = !exclusions.iter().any(|re| re.is_match(path));
            if counting {
                debug!(path = %path, "Counting changes in file");
            } else {
                debug!(path = %path, "Ignoring excluded file");
            }
            idx += 2;
            continue;
        }

        let line = lines[idx];
        if counting && (line.starts_with('+') || line.starts_with('-')) {
            count += 1;
        }
        idx += 1;
    }

    count
}
