use std::process::Command;

/// Owner and name of the repository behind the `origin` remote.
pub fn get_current_repo() -> Option<(String, String)> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    parse_repository_url(&url)
}

/// Extract `(owner, repo)` from any of the repository references GitHub hands out:
/// REST API URLs (`https://api.github.com/repos/owner/repo[/pulls/1]`),
/// web and clone URLs, SSH remotes and bare `owner/repo` slugs.
pub fn parse_repository_url(url: &str) -> Option<(String, String)> {
    // API URLs carry the pair right after `/repos/`
    if let Some((_, rest)) = url.split_once("/repos/") {
        return split_owner_repo(rest);
    }

    // Handle SSH: git@github.com:owner/repo.git
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return split_owner_repo(path);
    }

    // Handle HTTPS: https://github.com/owner/repo.git
    if url.contains("github.com") {
        let path = url.split("github.com").nth(1)?;
        let path = path.trim_start_matches('/').trim_start_matches(':');
        return split_owner_repo(path);
    }

    // Bare slug, as found in GITHUB_REPOSITORY
    if !url.contains("://") && url.matches('/').count() == 1 {
        return split_owner_repo(url);
    }

    None
}

fn split_owner_repo(path: &str) -> Option<(String, String)> {
    let mut parts = path.split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Some((owner.to_string(), repo.to_string()))
}
