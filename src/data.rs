pub mod events;
pub mod models;
pub mod types;

pub use events::{IssuesEvent, PullRequestEvent, WebhookEvent};
pub use models::{LabelDefinition, LabelUpdates, Target, TargetKey, TargetKind};
pub use types::{
    is_open, AuthorAssociation, BranchRef, ContentPayload, IssuePayload, LabelPayload, MergeState,
    PullRequestPayload, RepositoryRef, TargetType, TeamMembershipPayload, UserRef,
};
