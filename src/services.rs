pub mod github;
pub mod providers;

pub use github::{get_github_token, GitHubClient};
pub use providers::{
    ConfigProvider, DiffProvider, LabelCatalog, LabelStore, RepositoryLister, StaticConfig,
    TeamDirectory,
};
