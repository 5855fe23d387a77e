pub mod config;
pub mod data;
pub mod errors;
pub mod labeler;
pub mod services;
pub mod utils;

pub use config::{parse_config, LabelMatcher, LabelerConfig};
pub use data::{LabelUpdates, Target};
pub use labeler::{is_bulk_event, Labeler};
pub use services::GitHubClient;
