pub mod diff;
pub mod git;

pub use diff::{changed_files, count_changed_lines};
pub use git::{get_current_repo, parse_repository_url};
