use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use prlabeler::labeler::sync_label_definitions;
use prlabeler::services::get_github_token;
use prlabeler::utils::{get_current_repo, parse_repository_url};
use prlabeler::{is_bulk_event, parse_config, GitHubClient, Labeler};

/// Label GitHub pull requests and issues from a declarative rule set
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),

    /// GitHub token (falls back to `gh auth token`)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Name of the event that triggered the run
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event_name: String,

    /// Path to the JSON webhook payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Repository as `owner/name` (defaults to the git remote)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Commit to read the rule set from
    #[arg(long, env = "GITHUB_SHA")]
    sha: Option<String>,

    /// Path of the rule set inside the repository
    #[arg(long, env = "INPUT_CONFIG_PATH", default_value = ".github/labeler.yml")]
    config_path: String,

    /// Read the rule set from a local file instead of the repository
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// GitHub API root, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prlabeler=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_repository(cli: &Cli) -> Result<(String, String)> {
    match cli.repository.as_deref() {
        Some(slug) => parse_repository_url(slug)
            .ok_or_else(|| anyhow::anyhow!("Invalid repository `{slug}`, expected owner/name")),
        None => get_current_repo().ok_or_else(|| {
            anyhow::anyhow!("Could not determine the repository. Set GITHUB_REPOSITORY or run inside a git checkout")
        }),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let token = match cli.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => get_github_token()?,
    };
    let (owner, repo) = resolve_repository(&cli)?;

    let client = match cli.api_url.as_deref() {
        Some(url) => GitHubClient::with_base_uri(&token, url)?,
        None => GitHubClient::new(&token)?,
    };

    let raw = match &cli.config_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read {}", path.display()))?,
        None => {
            client
                .fetch_repo_file(&owner, &repo, &cli.config_path, cli.sha.as_deref())
                .await?
        }
    };
    let config = parse_config(&raw).context("Unable to parse labeler config")?;

    info!(
        "Re-evaluating labels on {owner}/{repo}@{}",
        cli.sha.as_deref().unwrap_or("HEAD")
    );

    if let Err(e) = sync_label_definitions(&client, &owner, &repo, &config).await {
        warn!("Unable to sync label definitions: {e:#}");
    }

    let labeler = Labeler::for_github(client, config);

    if is_bulk_event(&cli.event_name) {
        let summary = labeler.process_repository(&owner, &repo).await?;
        if summary.failed > 0 {
            warn!(failed = summary.failed, "Some items could not be labeled");
        }
        return Ok(());
    }

    let event_path = cli
        .event_path
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("GITHUB_EVENT_PATH is required for `{}` events", cli.event_name))?;
    let payload = std::fs::read(event_path)
        .with_context(|| format!("Unable to read event payload {}", event_path.display()))?;

    labeler.handle_event(&cli.event_name, &payload).await?;
    Ok(())
}
